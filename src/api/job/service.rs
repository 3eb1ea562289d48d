use std::sync::Arc;

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::api::validation::ErrorResponse;
use crate::db::job_repository::{JobRepository, RepositoryError};
use crate::db::models::{now, Job, JobPatch, NewJob};

/// Service-level errors
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Request input broke one or more rules
    #[error("validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    /// Carries the id as the client wrote it
    #[error("Job with id {0} does not exist")]
    NotFound(String),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl ResponseError for ServiceError {
    fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            ServiceError::Validation(details) => {
                warn!("Validation error: {:?}", details);
                ErrorResponse::invalid_request(details.clone())
            }
            ServiceError::NotFound(id) => {
                warn!("Job not found: {}", id);
                ErrorResponse::new(self.status_code(), self.to_string())
            }
            ServiceError::Repository(e) => {
                error!("Repository error: {}", e);
                ErrorResponse::new(self.status_code(), "An internal server error occurred")
            }
        };
        HttpResponse::build(self.status_code()).json(body)
    }
}

/// Job service containing business logic
#[derive(Clone)]
pub struct JobService {
    repository: Arc<dyn JobRepository>,
}

impl JobService {
    /// Create a new JobService over an already connected repository
    pub fn new(repository: Arc<dyn JobRepository>) -> Self {
        Self { repository }
    }

    pub fn repository(&self) -> &dyn JobRepository {
        self.repository.as_ref()
    }

    /// Create a single job
    ///
    /// # Business Logic
    /// - Assigns a fresh id and `createdAt`
    /// - Persists the job
    pub async fn create_job(&self, input: NewJob) -> Result<Job, ServiceError> {
        let job = Job::create(input, now());
        info!("Service: Creating job id={} type={:?}", job.id, job.job_type);

        self.repository.insert(&job).await?;

        info!("Service: Job created successfully with id={}", job.id);
        Ok(job)
    }

    /// All jobs, most recently created first
    pub async fn list_jobs(&self) -> Result<Vec<Job>, ServiceError> {
        let jobs = self.repository.find_all().await?;
        info!("Service: Listed {} jobs", jobs.len());
        Ok(jobs)
    }

    pub async fn get_job(&self, id: Uuid) -> Result<Job, ServiceError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(id.to_string()))
    }

    /// Apply a partial update
    ///
    /// # Business Logic
    /// - Fails with `NotFound` when the job is absent
    /// - Overwrites status, and contact email when given
    /// - Refreshes `updatedAt`
    ///
    /// Concurrent patches to one id are last-write-wins.
    pub async fn patch_job(&self, id: Uuid, patch: JobPatch) -> Result<Job, ServiceError> {
        let mut job = self.get_job(id).await?;
        job.apply_patch(patch, now());

        // the job may have been deleted since it was read
        if !self.repository.update_by_id(&job).await? {
            return Err(ServiceError::NotFound(id.to_string()));
        }

        info!("Service: Job {} updated, status={:?}", id, job.status);
        Ok(job)
    }

    /// Remove a job. Deleting an unknown id succeeds.
    pub async fn delete_job(&self, id: Uuid) -> Result<(), ServiceError> {
        if self.repository.delete_by_id(id).await? {
            info!("Service: Job {} deleted", id);
        } else {
            info!("Service: Delete of unknown job {} ignored", id);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::InMemoryJobRepository;
    use crate::db::job_repository::FailingJobRepository;
    use crate::db::models::{JobStatus, JobType};

    fn service() -> JobService {
        JobService::new(Arc::new(InMemoryJobRepository::new()))
    }

    fn new_job() -> NewJob {
        NewJob {
            job_type: JobType::Scheduled,
            price_in_pence: 1200,
            contact_email: None,
            status: JobStatus::Available,
        }
    }

    #[actix_web::test]
    async fn test_create_then_get() {
        let service = service();
        let created = service.create_job(new_job()).await.unwrap();

        assert!(created.updated_at.is_none());
        assert_eq!(service.get_job(created.id).await.unwrap(), created);
    }

    #[actix_web::test]
    async fn test_list_is_empty_without_jobs() {
        assert!(service().list_jobs().await.unwrap().is_empty());
    }

    #[actix_web::test]
    async fn test_patch_unknown_job_is_not_found() {
        let id = Uuid::new_v4();
        let result = service()
            .patch_job(
                id,
                JobPatch {
                    status: JobStatus::Completed,
                    contact_email: None,
                },
            )
            .await;

        assert!(matches!(result, Err(ServiceError::NotFound(missing)) if missing == id.to_string()));
    }

    #[actix_web::test]
    async fn test_patch_persists_changes() {
        let service = service();
        let created = service.create_job(new_job()).await.unwrap();

        let patched = service
            .patch_job(
                created.id,
                JobPatch {
                    status: JobStatus::Assigned,
                    contact_email: Some("crew@example.com".to_string()),
                },
            )
            .await
            .unwrap();

        assert_eq!(service.get_job(created.id).await.unwrap(), patched);
        assert_eq!(patched.created_at, created.created_at);
        assert!(patched.updated_at.is_some());
    }

    #[actix_web::test]
    async fn test_delete_is_idempotent() {
        let service = service();
        let created = service.create_job(new_job()).await.unwrap();

        service.delete_job(created.id).await.unwrap();
        service.delete_job(created.id).await.unwrap();

        assert!(matches!(
            service.get_job(created.id).await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[test]
    fn test_error_statuses() {
        assert_eq!(
            ServiceError::Validation(vec![]).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServiceError::NotFound(Uuid::nil().to_string()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ServiceError::Repository(RepositoryError::Corrupt {
                id: "n/a".to_string(),
                reason: "unreadable".to_string(),
            }).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[actix_web::test]
    async fn test_repository_failure_surfaces_as_internal_error() {
        let service = JobService::new(Arc::new(FailingJobRepository));

        assert!(matches!(
            service.create_job(new_job()).await,
            Err(ServiceError::Repository(_))
        ));
        assert!(matches!(
            service.delete_job(Uuid::new_v4()).await,
            Err(ServiceError::Repository(_))
        ));
    }
}
