use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::db::job_repository::{JobRepository, RepositoryError};
use crate::db::models::Job;

/// Process-local repository, kept in insertion order
#[derive(Debug, Default)]
pub struct InMemoryJobRepository {
    jobs: RwLock<Vec<Job>>,
}

impl InMemoryJobRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl JobRepository for InMemoryJobRepository {
    async fn find_all(&self) -> Result<Vec<Job>, RepositoryError> {
        let mut jobs: Vec<Job> = self.jobs.read().await.iter().rev().cloned().collect();
        // stable sort, so equal timestamps stay newest-inserted first
        jobs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(jobs)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Job>, RepositoryError> {
        let jobs = self.jobs.read().await;
        Ok(jobs.iter().find(|job| job.id == id).cloned())
    }

    async fn insert(&self, job: &Job) -> Result<(), RepositoryError> {
        debug!("Inserting job id={}", job.id);
        self.jobs.write().await.push(job.clone());
        Ok(())
    }

    async fn update_by_id(&self, job: &Job) -> Result<bool, RepositoryError> {
        let mut jobs = self.jobs.write().await;
        match jobs.iter_mut().find(|stored| stored.id == job.id) {
            Some(stored) => {
                stored.status = job.status;
                stored.contact_email = job.contact_email.clone();
                stored.updated_at = job.updated_at;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<bool, RepositoryError> {
        let mut jobs = self.jobs.write().await;
        let before = jobs.len();
        jobs.retain(|job| job.id != id);
        Ok(jobs.len() != before)
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }

    async fn close(&self) {
        debug!("In-memory job repository closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::{now, JobPatch, JobStatus, JobType, NewJob};

    fn job(price_in_pence: i64) -> Job {
        Job::create(
            NewJob {
                job_type: JobType::OnDemand,
                price_in_pence,
                contact_email: None,
                status: JobStatus::Available,
            },
            now(),
        )
    }

    #[actix_web::test]
    async fn test_find_all_orders_newest_first() {
        let repo = InMemoryJobRepository::new();
        let mut older = job(100);
        older.created_at = older.created_at - chrono::Duration::seconds(10);
        let newer = job(200);
        let same_instant = Job {
            id: Uuid::new_v4(),
            ..newer.clone()
        };

        repo.insert(&older).await.unwrap();
        repo.insert(&newer).await.unwrap();
        repo.insert(&same_instant).await.unwrap();

        let ids: Vec<Uuid> = repo.find_all().await.unwrap().iter().map(|j| j.id).collect();
        assert_eq!(ids, vec![same_instant.id, newer.id, older.id]);
    }

    #[actix_web::test]
    async fn test_update_only_touches_mutable_fields() {
        let repo = InMemoryJobRepository::new();
        let stored = job(100);
        repo.insert(&stored).await.unwrap();

        let mut changed = stored.clone();
        changed.price_in_pence = 9999;
        changed.apply_patch(
            JobPatch {
                status: JobStatus::Completed,
                contact_email: Some("done@example.com".to_string()),
            },
            now(),
        );
        assert!(repo.update_by_id(&changed).await.unwrap());

        let found = repo.find_by_id(stored.id).await.unwrap().unwrap();
        assert_eq!(found.price_in_pence, 100);
        assert_eq!(found.status, JobStatus::Completed);
        assert_eq!(found.contact_email.as_deref(), Some("done@example.com"));
        assert!(found.updated_at.is_some());
    }

    #[actix_web::test]
    async fn test_update_and_delete_report_missing_ids() {
        let repo = InMemoryJobRepository::new();
        let missing = job(100);

        assert!(!repo.update_by_id(&missing).await.unwrap());
        assert!(!repo.delete_by_id(missing.id).await.unwrap());

        repo.insert(&missing).await.unwrap();
        assert!(repo.delete_by_id(missing.id).await.unwrap());
        assert!(repo.find_by_id(missing.id).await.unwrap().is_none());
    }
}
