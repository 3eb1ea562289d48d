use actix_web::{error::JsonPayloadError, http::StatusCode, web, HttpResponse};
use serde::Serialize;
use serde_json::Value;
use tracing::warn;
use uuid::Uuid;
use validator::ValidateEmail;

use crate::db::models::Choice;

/// Largest integer a JSON number can carry without losing precision
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

pub const INVALID_JSON: &str = "Invalid request payload JSON format";

/// Error body shared by every failing endpoint
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub status_code: u16,
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
}

impl ErrorResponse {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status_code: status.as_u16(),
            error: status.canonical_reason().unwrap_or("Unknown").to_string(),
            message: message.into(),
            details: None,
        }
    }

    /// 400 listing every violated rule
    pub fn invalid_request(details: Vec<String>) -> Self {
        Self {
            details: Some(details),
            ..Self::new(StatusCode::BAD_REQUEST, "Invalid request")
        }
    }
}

/// Creates a configured JsonConfig with standardized error handling for the entire project
pub fn json_config(limit: usize) -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(limit)
        .error_handler(|err, req| {
            warn!("Rejected {} {} payload: {}", req.method(), req.path(), err);

            let body = match &err {
                JsonPayloadError::OverflowKnownLength { .. } | JsonPayloadError::Overflow { .. } => {
                    ErrorResponse::new(
                        StatusCode::PAYLOAD_TOO_LARGE,
                        "Payload content length greater than maximum allowed",
                    )
                }
                JsonPayloadError::ContentType => {
                    ErrorResponse::new(StatusCode::UNSUPPORTED_MEDIA_TYPE, "Unsupported Media Type")
                }
                _ => ErrorResponse {
                    details: Some(vec![INVALID_JSON.to_string()]),
                    ..ErrorResponse::new(StatusCode::BAD_REQUEST, INVALID_JSON)
                },
            };

            let status = StatusCode::from_u16(body.status_code).unwrap_or(StatusCode::BAD_REQUEST);
            actix_web::error::InternalError::from_response(err, HttpResponse::build(status).json(body)).into()
        })
}

/// Path identifier check
pub fn id_param(raw: &str) -> Result<Uuid, String> {
    Uuid::parse_str(raw.trim()).map_err(|_| "id must be a valid UUID".to_string())
}

/// Required member of a closed set of strings
pub fn choice_field<T: Choice>(field: &str, value: Option<Value>) -> Result<T, String> {
    match value {
        None | Some(Value::Null) => Err(format!("{} is required", field)),
        Some(Value::String(s)) => {
            T::parse(&s).ok_or_else(|| format!("{} must be one of {}", field, T::listing()))
        }
        Some(_) => Err(format!("{} must be one of {}", field, T::listing())),
    }
}

/// Required non-negative integer. Numeric strings are converted.
pub fn amount_field(field: &str, value: Option<Value>) -> Result<i64, String> {
    let number = match value {
        None | Some(Value::Null) => return Err(format!("{} is required", field)),
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        Some(_) => None,
    }
    .ok_or_else(|| format!("{} must be a number", field))?;

    if number.abs() > MAX_SAFE_INTEGER {
        return Err(format!("{} must be a safe number", field));
    }
    if number < 0.0 {
        return Err(format!("{} must be a positive number", field));
    }
    if number.fract() != 0.0 {
        return Err(format!("{} must be an integer", field));
    }
    Ok(number as i64)
}

/// Optional email address, trimmed before checking
pub fn email_field(field: &str, value: Option<Value>) -> Result<Option<String>, String> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => {
            let email = s.trim().to_string();
            if email.is_empty() {
                Err(format!("{} is not allowed to be empty", field))
            } else if email.validate_email() && has_public_domain(&email) {
                Ok(Some(email))
            } else {
                Err(format!("{} must be a valid email address", field))
            }
        }
        Some(_) => Err(format!("{} must be a string", field)),
    }
}

/// At least two domain labels, ending in an alphabetic top-level label
fn has_public_domain(email: &str) -> bool {
    let Some((_, domain)) = email.rsplit_once('@') else {
        return false;
    };
    let labels: Vec<&str> = domain.split('.').collect();

    labels.len() >= 2
        && labels.iter().all(|label| !label.is_empty())
        && labels
            .last()
            .is_some_and(|tld| tld.len() >= 2 && tld.chars().all(|c| c.is_ascii_alphabetic()))
}

/// Accumulates rule violations in the order fields are checked
#[derive(Debug, Default)]
pub struct Violations(Vec<String>);

impl Violations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the error, if any, and passes the value through
    pub fn check<T>(&mut self, result: Result<T, String>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(message) => {
                self.0.push(message);
                None
            }
        }
    }

    pub fn into_messages(self) -> Vec<String> {
        self.0
    }
}
