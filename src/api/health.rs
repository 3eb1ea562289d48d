use actix_web::{HttpResponse, Responder, get, web};
use serde::Serialize;
use tracing::error;

use crate::api::job::JobService;

/// Health check response
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    database: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Liveness check endpoint
///
/// Simple check that the process is alive. Does not check dependencies.
#[get("/healthcheck")]
async fn healthcheck() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "OK",
        database: None,
        error: None,
    })
}

/// Readiness check endpoint
///
/// Checks if service is ready to accept traffic (includes database check).
/// Returns 503 if the job store is unavailable; the process recovers when it returns.
#[get("/ready")]
async fn readiness_check(service: web::Data<JobService>) -> impl Responder {
    match service.repository().ping().await {
        Ok(()) => HttpResponse::Ok().json(HealthResponse {
            status: "ready",
            database: Some("connected"),
            error: None,
        }),
        Err(e) => {
            error!("Readiness check failed: database unavailable: {}", e);
            HttpResponse::ServiceUnavailable().json(HealthResponse {
                status: "not_ready",
                database: Some("disconnected"),
                error: Some("Database unavailable".to_string()),
            })
        }
    }
}

pub fn health_config(config: &mut web::ServiceConfig) {
    config.service(healthcheck).service(readiness_check);
}
