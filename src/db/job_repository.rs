use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::db::models::Job;

/// Errors raised by a job repository
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] mongodb::error::Error),

    /// A stored document could not be mapped back onto a job
    #[error("corrupt job document {id}: {reason}")]
    Corrupt { id: String, reason: String },
}

/// Persistence adapter for jobs
///
/// Implementations are shared across request handlers and must be safe to
/// call concurrently. Concurrent updates to the same id are last-write-wins.
#[async_trait]
pub trait JobRepository: Send + Sync {
    /// All jobs, most recently created first
    async fn find_all(&self) -> Result<Vec<Job>, RepositoryError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Job>, RepositoryError>;

    async fn insert(&self, job: &Job) -> Result<(), RepositoryError>;

    /// Persists the mutable fields of `job`. Returns `false` when no job has that id.
    async fn update_by_id(&self, job: &Job) -> Result<bool, RepositoryError>;

    /// Returns whether a job was removed
    async fn delete_by_id(&self, id: Uuid) -> Result<bool, RepositoryError>;

    /// Round trip to the backing store, used by readiness checks
    async fn ping(&self) -> Result<(), RepositoryError>;

    /// Releases connections held by the repository
    async fn close(&self);
}

/// Repository whose every call fails, for exercising error paths
#[cfg(test)]
pub(crate) struct FailingJobRepository;

#[cfg(test)]
impl FailingJobRepository {
    fn error() -> RepositoryError {
        RepositoryError::Corrupt {
            id: "n/a".to_string(),
            reason: "store offline".to_string(),
        }
    }
}

#[cfg(test)]
#[async_trait]
impl JobRepository for FailingJobRepository {
    async fn find_all(&self) -> Result<Vec<Job>, RepositoryError> {
        Err(Self::error())
    }

    async fn find_by_id(&self, _id: Uuid) -> Result<Option<Job>, RepositoryError> {
        Err(Self::error())
    }

    async fn insert(&self, _job: &Job) -> Result<(), RepositoryError> {
        Err(Self::error())
    }

    async fn update_by_id(&self, _job: &Job) -> Result<bool, RepositoryError> {
        Err(Self::error())
    }

    async fn delete_by_id(&self, _id: Uuid) -> Result<bool, RepositoryError> {
        Err(Self::error())
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        Err(Self::error())
    }

    async fn close(&self) {}
}
