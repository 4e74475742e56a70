//! Local filesystem storage provider.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::StreamExt;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio_util::io::ReaderStream;
use tracing::debug;

use inkpress_core::error::{AppError, ErrorKind};
use inkpress_core::keys;
use inkpress_core::result::AppResult;
use inkpress_core::traits::storage::{ByteStream, ObjectDownload, ObjectStore, PutResult};

/// Local filesystem storage provider.
///
/// Object keys map to relative paths under the configured root. The root is
/// owned exclusively by this provider; key validation guarantees nothing
/// resolves outside it.
#[derive(Debug, Clone)]
pub struct LocalObjectStore {
    /// Root directory for all stored media.
    root: PathBuf,
}

impl LocalObjectStore {
    /// Create a new local store rooted at the given path.
    pub async fn new(root_path: &str) -> AppResult<Self> {
        let root = PathBuf::from(root_path);
        fs::create_dir_all(&root).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Configuration,
                format!("Failed to create storage root: {}", root.display()),
                e,
            )
        })?;
        Ok(Self { root })
    }

    /// Resolve a validated key to an absolute path within the root.
    fn resolve(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }

    /// Ensure the parent directory of a path exists.
    async fn ensure_parent(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                AppError::with_source(
                    ErrorKind::StorageWrite,
                    format!("Failed to create parent directory: {}", parent.display()),
                    e,
                )
                .retryable(false)
            })?;
        }
        Ok(())
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    fn provider_type(&self) -> &str {
        "local"
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(self.root.exists() && self.root.is_dir())
    }

    async fn put_object(
        &self,
        key: &str,
        _content_type: Option<&str>,
        data: Bytes,
    ) -> AppResult<PutResult> {
        keys::validate(key)?;
        let full_path = self.resolve(key);
        self.ensure_parent(&full_path).await?;

        fs::write(&full_path, &data).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::StorageWrite,
                format!("Failed to write object: {key}"),
                e,
            )
            .retryable(false)
        })?;

        debug!(key, bytes = data.len(), "Stored object");
        Ok(PutResult {
            size: data.len() as u64,
        })
    }

    async fn put_object_stream(
        &self,
        key: &str,
        _content_type: Option<&str>,
        mut stream: ByteStream,
    ) -> AppResult<PutResult> {
        keys::validate(key)?;
        let full_path = self.resolve(key);
        self.ensure_parent(&full_path).await?;

        let mut file = fs::File::create(&full_path).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::StorageWrite,
                format!("Failed to create object: {key}"),
                e,
            )
            .retryable(false)
        })?;

        let mut total_bytes = 0u64;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| {
                AppError::with_source(ErrorKind::StorageWrite, "Upload stream read error", e)
                    .retryable(true)
            })?;
            total_bytes += chunk.len() as u64;
            file.write_all(&chunk).await.map_err(|e| {
                AppError::with_source(ErrorKind::StorageWrite, "Failed to write chunk", e)
                    .retryable(false)
            })?;
        }

        file.flush().await.map_err(|e| {
            AppError::with_source(ErrorKind::StorageWrite, "Failed to flush object", e)
                .retryable(false)
        })?;

        debug!(key, bytes = total_bytes, "Stored object from stream");
        Ok(PutResult { size: total_bytes })
    }

    async fn get_object(&self, key: &str) -> AppResult<ObjectDownload> {
        keys::validate(key)?;
        let full_path = self.resolve(key);
        let file = fs::File::open(&full_path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AppError::not_found(format!("Object not found: {key}"))
            } else {
                AppError::with_source(
                    ErrorKind::StorageRead,
                    format!("Failed to open object: {key}"),
                    e,
                )
                .retryable(false)
            }
        })?;

        let meta = file.metadata().await.map_err(|e| {
            AppError::with_source(
                ErrorKind::StorageRead,
                format!("Failed to stat object: {key}"),
                e,
            )
            .retryable(false)
        })?;

        let stream = ReaderStream::new(file);
        Ok(ObjectDownload {
            stream: Box::pin(stream),
            content_type: mime_from_key(key),
            content_length: meta.len(),
        })
    }

    async fn delete_object(&self, key: &str) -> AppResult<()> {
        keys::validate(key)?;
        let full_path = self.resolve(key);
        if full_path.exists() {
            fs::remove_file(&full_path).await.map_err(|e| {
                AppError::with_source(
                    ErrorKind::StorageWrite,
                    format!("Failed to delete object: {key}"),
                    e,
                )
                .retryable(false)
            })?;
        }
        Ok(())
    }
}

/// Guess MIME type from a key's file extension.
///
/// The local filesystem has nowhere to persist the declared content type,
/// so downloads infer it from the key instead.
pub(crate) fn mime_from_key(key: &str) -> Option<String> {
    let ext = key.rsplit('.').next()?.to_lowercase();
    let mime = match ext.as_str() {
        "txt" => "text/plain",
        "html" | "htm" => "text/html",
        "css" => "text/css",
        "js" => "application/javascript",
        "json" => "application/json",
        "xml" => "application/xml",
        "pdf" => "application/pdf",
        "zip" => "application/zip",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "webp" => "image/webp",
        "avif" => "image/avif",
        "ico" => "image/x-icon",
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "ogg" => "audio/ogg",
        "csv" => "text/csv",
        "md" => "text/markdown",
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        _ => return None,
    };
    Some(mime.to_string())
}
