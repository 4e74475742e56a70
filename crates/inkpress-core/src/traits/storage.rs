//! Object store trait for pluggable media storage backends.

use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;

use crate::result::AppResult;

/// A byte stream type used for object bodies in both directions.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, std::io::Error>> + Send>>;

/// Result of a successful write.
#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize)]
pub struct PutResult {
    /// Number of bytes stored.
    pub size: u64,
}

/// A downloaded object: its body stream plus the metadata needed to serve it.
pub struct ObjectDownload {
    /// Streaming object body.
    pub stream: ByteStream,
    /// Content type recorded at upload time (or inferred by the provider).
    pub content_type: Option<String>,
    /// Total body length in bytes.
    pub content_length: u64,
}

impl std::fmt::Debug for ObjectDownload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectDownload")
            .field("content_type", &self.content_type)
            .field("content_length", &self.content_length)
            .finish_non_exhaustive()
    }
}

/// Trait for media storage backends.
///
/// Implementations exist for local filesystem, in-memory, S3-compatible
/// object stores, and Google Cloud Storage. The [`ObjectStore`] trait is
/// defined here in `inkpress-core` and implemented in `inkpress-storage`.
///
/// Contract, uniform across providers:
/// - every operation validates the object key before any I/O;
/// - `put_object` overwrites an existing key in place (last-writer-wins);
/// - `get_object` fails with `NotFound` when the key is absent,
///   `StorageRead` on any other failure;
/// - `delete_object` is idempotent, deleting a missing key is not an error.
#[async_trait]
pub trait ObjectStore: Send + Sync + std::fmt::Debug + 'static {
    /// Return the provider type name (e.g., "local", "s3").
    fn provider_type(&self) -> &str;

    /// Check whether the provider is healthy and reachable.
    async fn health_check(&self) -> AppResult<bool>;

    /// Store a fully-buffered object under `key`.
    async fn put_object(
        &self,
        key: &str,
        content_type: Option<&str>,
        data: Bytes,
    ) -> AppResult<PutResult>;

    /// Store a streamed object under `key`.
    async fn put_object_stream(
        &self,
        key: &str,
        content_type: Option<&str>,
        stream: ByteStream,
    ) -> AppResult<PutResult>;

    /// Fetch the object stored under `key`.
    async fn get_object(&self, key: &str) -> AppResult<ObjectDownload>;

    /// Delete the object stored under `key`, if present.
    async fn delete_object(&self, key: &str) -> AppResult<()>;
}
