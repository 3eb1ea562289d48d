use actix_web::{
    delete, get, patch, post,
    web::{Data, Json, Path, ServiceConfig, scope},
    HttpResponse,
};
use serde_json::{Map, Value};

use crate::api::validation::{id_param, Violations};
use super::dto::{JobListResponse, JobResponse};
use super::models::{CreateJobPayload, PatchJobPayload};
use super::service::{JobService, ServiceError};

fn parse_id(raw: &str, violations: &mut Violations) -> Option<uuid::Uuid> {
    violations.check(id_param(raw))
}

/// Reports a missing job under the id exactly as the client wrote it
fn as_requested(raw: &str) -> impl Fn(ServiceError) -> ServiceError + '_ {
    move |err| match err {
        ServiceError::NotFound(_) => ServiceError::NotFound(raw.to_string()),
        other => other,
    }
}

#[get("")]
async fn list_jobs(service: Data<JobService>) -> Result<HttpResponse, ServiceError> {
    let jobs = service.list_jobs().await?;
    Ok(HttpResponse::Ok().json(JobListResponse::from(jobs.as_slice())))
}

#[post("")]
async fn create_job(
    service: Data<JobService>,
    payload: Json<Map<String, Value>>,
) -> Result<HttpResponse, ServiceError> {
    let mut violations = Violations::new();
    let Some(input) = CreateJobPayload::from(payload.into_inner()).validate(&mut violations) else {
        return Err(ServiceError::Validation(violations.into_messages()));
    };

    let job = service.create_job(input).await?;
    Ok(HttpResponse::Created().json(JobResponse::from(&job)))
}

#[get("/{id}")]
async fn get_job(
    service: Data<JobService>,
    path: Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let mut violations = Violations::new();
    let Some(id) = parse_id(&path, &mut violations) else {
        return Err(ServiceError::Validation(violations.into_messages()));
    };

    let job = service.get_job(id).await.map_err(as_requested(&path))?;
    Ok(HttpResponse::Ok().json(JobResponse::from(&job)))
}

#[patch("/{id}")]
async fn patch_job(
    service: Data<JobService>,
    path: Path<String>,
    payload: Json<Map<String, Value>>,
) -> Result<HttpResponse, ServiceError> {
    let mut violations = Violations::new();
    let id = parse_id(&path, &mut violations);
    let job_patch = PatchJobPayload::from(payload.into_inner()).validate(&mut violations);

    let (Some(id), Some(job_patch)) = (id, job_patch) else {
        return Err(ServiceError::Validation(violations.into_messages()));
    };

    let job = service
        .patch_job(id, job_patch)
        .await
        .map_err(as_requested(&path))?;
    Ok(HttpResponse::Ok().json(JobResponse::from(&job)))
}

#[delete("/{id}")]
async fn delete_job(
    service: Data<JobService>,
    path: Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let mut violations = Violations::new();
    let Some(id) = parse_id(&path, &mut violations) else {
        return Err(ServiceError::Validation(violations.into_messages()));
    };

    service.delete_job(id).await?;
    Ok(HttpResponse::NoContent().finish())
}

pub fn job_config(config: &mut ServiceConfig) {
    config.service(
        scope("/jobs")
            .service(list_jobs)
            .service(create_job)
            .service(get_job)
            .service(patch_job)
            .service(delete_job),
    );
}
