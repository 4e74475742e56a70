//! Provider factory — constructs the configured storage backend.

use std::sync::Arc;

use inkpress_core::config::storage::{StorageConfig, StorageProviderKind};
use inkpress_core::result::AppResult;
use inkpress_core::traits::storage::ObjectStore;

use crate::providers::{GcsObjectStore, LocalObjectStore, MemoryObjectStore, S3ObjectStore};

/// Build the object store selected by configuration.
///
/// Selection is a pure function of [`StorageConfig`]. Configuration is
/// validated eagerly so missing provider fields fail construction with an
/// error naming them, before any request is served.
pub async fn build_store(config: &StorageConfig) -> AppResult<Arc<dyn ObjectStore>> {
    config.validate()?;

    let store: Arc<dyn ObjectStore> = match config.provider {
        StorageProviderKind::Local => Arc::new(LocalObjectStore::new(&config.local.root_path).await?),
        StorageProviderKind::Memory => Arc::new(MemoryObjectStore::new()),
        StorageProviderKind::S3 => Arc::new(S3ObjectStore::new(&config.s3, "s3").await?),
        StorageProviderKind::R2 => Arc::new(S3ObjectStore::new(&config.s3, "r2").await?),
        StorageProviderKind::Gcs => Arc::new(GcsObjectStore::new(&config.gcs)?),
    };

    tracing::info!(provider = store.provider_type(), "Storage provider ready");
    Ok(store)
}
