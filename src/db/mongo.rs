use async_trait::async_trait;
use bson::{doc, oid::ObjectId, Document};
use futures_util::TryStreamExt;
use mongodb::{
    options::{FindOptions, IndexOptions},
    Client, Collection, Database, IndexModel,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument};
use uuid::Uuid;

use crate::db::job_repository::{JobRepository, RepositoryError};
use crate::db::models::{format_timestamp, parse_timestamp, Choice, Job, JobStatus, JobType};

const COLLECTION: &str = "jobs";

/// Stored shape of a job. `_id` and `__v` stay inside this module.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JobDocument {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    object_id: Option<ObjectId>,
    id: String,
    #[serde(rename = "type")]
    job_type: JobType,
    price_in_pence: i64,
    contact_email: Option<String>,
    status: JobStatus,
    created_at: String,
    updated_at: Option<String>,
    #[serde(rename = "__v", default)]
    version: i32,
}

impl From<&Job> for JobDocument {
    fn from(job: &Job) -> Self {
        Self {
            object_id: None,
            id: job.id.to_string(),
            job_type: job.job_type,
            price_in_pence: job.price_in_pence,
            contact_email: job.contact_email.clone(),
            status: job.status,
            created_at: format_timestamp(&job.created_at),
            updated_at: job.updated_at.as_ref().map(format_timestamp),
            version: 0,
        }
    }
}

impl TryFrom<JobDocument> for Job {
    type Error = RepositoryError;

    fn try_from(document: JobDocument) -> Result<Self, Self::Error> {
        let corrupt = |reason: String| RepositoryError::Corrupt {
            id: document.id.clone(),
            reason,
        };

        let id = Uuid::parse_str(&document.id).map_err(|e| corrupt(e.to_string()))?;
        let created_at =
            parse_timestamp(&document.created_at).map_err(|e| corrupt(format!("createdAt: {}", e)))?;
        let updated_at = match document.updated_at.as_deref() {
            Some(text) => Some(parse_timestamp(text).map_err(|e| corrupt(format!("updatedAt: {}", e)))?),
            None => None,
        };

        Ok(Job {
            id,
            job_type: document.job_type,
            price_in_pence: document.price_in_pence,
            contact_email: document.contact_email,
            status: document.status,
            created_at,
            updated_at,
        })
    }
}

/// Job repository backed by a MongoDB collection
#[derive(Clone)]
pub struct MongoJobRepository {
    client: Client,
    database: Database,
}

impl MongoJobRepository {
    /// Connects, verifies the server answers, and ensures the `id` index exists.
    /// The client is shut down again if any of that fails.
    pub async fn connect(uri: &str, database_name: &str) -> Result<Self, RepositoryError> {
        let client = Client::with_uri_str(uri).await?;
        let repository = Self {
            database: client.database(database_name),
            client,
        };

        if let Err(e) = repository.prepare().await {
            error!("MongoDB setup failed, closing client: {}", e);
            repository.close().await;
            return Err(e);
        }

        info!("Connected to MongoDB database '{}'", database_name);
        Ok(repository)
    }

    async fn prepare(&self) -> Result<(), RepositoryError> {
        self.ping().await?;

        let index = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        self.collection().create_index(index, None).await?;
        Ok(())
    }

    fn collection(&self) -> Collection<JobDocument> {
        self.database.collection(COLLECTION)
    }

    fn by_id(id: Uuid) -> Document {
        doc! { "id": id.to_string() }
    }

    #[cfg(test)]
    async fn drop_database(&self) -> Result<(), mongodb::error::Error> {
        self.database.drop(None).await
    }
}

#[async_trait]
impl JobRepository for MongoJobRepository {
    #[instrument(skip_all, err)]
    async fn find_all(&self) -> Result<Vec<Job>, RepositoryError> {
        let options = FindOptions::builder()
            .sort(doc! { "createdAt": -1, "_id": -1 })
            .build();

        let documents: Vec<JobDocument> = self
            .collection()
            .find(doc! {}, options)
            .await?
            .try_collect()
            .await?;

        debug!("Loaded {} job documents", documents.len());
        documents.into_iter().map(Job::try_from).collect()
    }

    #[instrument(skip(self), err)]
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Job>, RepositoryError> {
        self.collection()
            .find_one(Self::by_id(id), None)
            .await?
            .map(Job::try_from)
            .transpose()
    }

    #[instrument(skip_all, err, fields(id = %job.id))]
    async fn insert(&self, job: &Job) -> Result<(), RepositoryError> {
        self.collection()
            .insert_one(JobDocument::from(job), None)
            .await?;
        Ok(())
    }

    #[instrument(skip_all, err, fields(id = %job.id))]
    async fn update_by_id(&self, job: &Job) -> Result<bool, RepositoryError> {
        let mut changes = doc! { "status": job.status.as_str() };
        if let Some(email) = &job.contact_email {
            changes.insert("contactEmail", email.as_str());
        }
        if let Some(updated_at) = &job.updated_at {
            changes.insert("updatedAt", format_timestamp(updated_at));
        }

        let result = self
            .collection()
            .update_one(Self::by_id(job.id), doc! { "$set": changes }, None)
            .await?;
        Ok(result.matched_count > 0)
    }

    #[instrument(skip(self), err)]
    async fn delete_by_id(&self, id: Uuid) -> Result<bool, RepositoryError> {
        let result = self.collection().delete_one(Self::by_id(id), None).await?;
        Ok(result.deleted_count > 0)
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        self.database.run_command(doc! { "ping": 1 }, None).await?;
        Ok(())
    }

    async fn close(&self) {
        self.client.clone().shutdown().await;
        info!("MongoDB client shut down");
    }
}
