use std::sync::Arc;

use tracing::info;

use crate::config::{Config, StoreBackend};
use crate::db::job_repository::{JobRepository, RepositoryError};
use crate::db::memory::InMemoryJobRepository;
use crate::db::mongo::MongoJobRepository;

/// Open the job repository selected by the configuration
///
/// The returned handle is shared by every HTTP worker and must be closed
/// explicitly on shutdown.
pub async fn get_connection(config: &Config) -> Result<Arc<dyn JobRepository>, RepositoryError> {
    match config.store {
        StoreBackend::Mongodb => {
            let repository = MongoJobRepository::connect(&config.database_url, &config.database_name).await?;
            Ok(Arc::new(repository))
        }
        StoreBackend::Memory => {
            info!("Using in-memory job repository; data is lost on exit");
            Ok(Arc::new(InMemoryJobRepository::new()))
        }
    }
}
