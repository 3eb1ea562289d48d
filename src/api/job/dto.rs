use serde::Serialize;

use crate::db::models::{format_timestamp, Job, JobStatus, JobType};

/// Client-facing view of a job. The external identifier is always `id`;
/// optional fields are omitted until they hold a value.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobView {
    pub id: String,
    #[serde(rename = "type")]
    pub job_type: JobType,
    pub price_in_pence: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_email: Option<String>,
    pub status: JobStatus,
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl From<&Job> for JobView {
    fn from(job: &Job) -> Self {
        Self {
            id: job.id.to_string(),
            job_type: job.job_type,
            price_in_pence: job.price_in_pence,
            contact_email: job.contact_email.clone(),
            status: job.status,
            created_at: format_timestamp(&job.created_at),
            updated_at: job.updated_at.as_ref().map(format_timestamp),
        }
    }
}

/// Response carrying a single job
#[derive(Serialize)]
pub struct JobResponse {
    pub job: JobView,
}

impl From<&Job> for JobResponse {
    fn from(job: &Job) -> Self {
        Self { job: job.into() }
    }
}

/// Response for the job listing
#[derive(Serialize)]
pub struct JobListResponse {
    pub jobs: Vec<JobView>,
}

impl From<&[Job]> for JobListResponse {
    fn from(jobs: &[Job]) -> Self {
        Self {
            jobs: jobs.iter().map(JobView::from).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::{now, JobPatch, NewJob};
    use serde_json::json;

    #[test]
    fn test_view_omits_unset_optional_fields() {
        let job = Job::create(
            NewJob {
                job_type: JobType::OnDemand,
                price_in_pence: 100,
                contact_email: None,
                status: JobStatus::Available,
            },
            now(),
        );

        let body = serde_json::to_value(JobView::from(&job)).unwrap();
        assert_eq!(
            body,
            json!({
                "id": job.id.to_string(),
                "type": "ON_DEMAND",
                "priceInPence": 100,
                "status": "AVAILABLE",
                "createdAt": format_timestamp(&job.created_at),
            })
        );
    }

    #[test]
    fn test_view_includes_contact_and_update_stamp() {
        let mut job = Job::create(
            NewJob {
                job_type: JobType::Shift,
                price_in_pence: 500,
                contact_email: None,
                status: JobStatus::Available,
            },
            now(),
        );
        job.apply_patch(
            JobPatch {
                status: JobStatus::Assigned,
                contact_email: Some("test@email.com".to_string()),
            },
            now(),
        );

        let body = serde_json::to_value(JobResponse::from(&job)).unwrap();
        assert_eq!(body["job"]["contactEmail"], "test@email.com");
        assert_eq!(body["job"]["status"], "ASSIGNED");
        assert!(body["job"]["updatedAt"].is_string());
    }
}
