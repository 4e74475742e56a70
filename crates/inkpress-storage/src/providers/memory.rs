//! In-memory storage provider.
//!
//! Holds objects in a process-wide concurrent map. Used by tests and as a
//! zero-configuration provider for ephemeral deployments.

use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;
use futures::stream::{self, TryStreamExt};

use inkpress_core::error::{AppError, ErrorKind};
use inkpress_core::keys;
use inkpress_core::result::AppResult;
use inkpress_core::traits::storage::{ByteStream, ObjectDownload, ObjectStore, PutResult};

#[derive(Debug, Clone)]
struct StoredEntry {
    data: Bytes,
    content_type: Option<String>,
}

/// In-memory storage provider.
#[derive(Debug, Default)]
pub struct MemoryObjectStore {
    objects: DashMap<String, StoredEntry>,
}

impl MemoryObjectStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored objects. Test visibility only.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether the store holds no objects.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    fn provider_type(&self) -> &str {
        "memory"
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }

    async fn put_object(
        &self,
        key: &str,
        content_type: Option<&str>,
        data: Bytes,
    ) -> AppResult<PutResult> {
        keys::validate(key)?;
        let size = data.len() as u64;
        self.objects.insert(
            key.to_string(),
            StoredEntry {
                data,
                content_type: content_type.map(str::to_string),
            },
        );
        Ok(PutResult { size })
    }

    async fn put_object_stream(
        &self,
        key: &str,
        content_type: Option<&str>,
        stream: ByteStream,
    ) -> AppResult<PutResult> {
        keys::validate(key)?;
        let chunks: Vec<Bytes> = stream.try_collect().await.map_err(|e| {
            AppError::with_source(ErrorKind::StorageWrite, "Upload stream read error", e)
                .retryable(true)
        })?;
        let data = Bytes::from(chunks.concat());
        self.put_object(key, content_type, data).await
    }

    async fn get_object(&self, key: &str) -> AppResult<ObjectDownload> {
        keys::validate(key)?;
        let entry = self
            .objects
            .get(key)
            .ok_or_else(|| AppError::not_found(format!("Object not found: {key}")))?;

        let data = entry.data.clone();
        let content_type = entry.content_type.clone();
        let content_length = data.len() as u64;
        let body: ByteStream =
            Box::pin(stream::once(async move { Ok::<_, std::io::Error>(data) }));

        Ok(ObjectDownload {
            stream: body,
            content_type,
            content_length,
        })
    }

    async fn delete_object(&self, key: &str) -> AppResult<()> {
        keys::validate(key)?;
        self.objects.remove(key);
        Ok(())
    }
}
