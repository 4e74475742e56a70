//! S3-compatible object storage provider.
//!
//! Serves AWS S3 as well as S3-compatible services (MinIO, Cloudflare R2)
//! by pointing `endpoint` at the service and forcing path-style addressing.

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::{Credentials, Region};
use aws_sdk_s3::error::SdkError;
use aws_sdk_s3::primitives::ByteStream as SdkByteStream;
use bytes::Bytes;
use futures::TryStreamExt;
use tokio_util::io::ReaderStream;
use tracing::debug;

use inkpress_core::config::storage::S3StorageConfig;
use inkpress_core::error::{AppError, ErrorKind};
use inkpress_core::keys;
use inkpress_core::result::AppResult;
use inkpress_core::traits::storage::{ByteStream, ObjectDownload, ObjectStore, PutResult};

/// S3-compatible storage provider.
#[derive(Debug, Clone)]
pub struct S3ObjectStore {
    client: Client,
    bucket: String,
    provider_name: &'static str,
}

impl S3ObjectStore {
    /// Create a new S3 store from validated configuration.
    ///
    /// `provider_name` distinguishes `"s3"` from `"r2"` in logs and health
    /// output; both use the same client.
    pub async fn new(config: &S3StorageConfig, provider_name: &'static str) -> AppResult<Self> {
        let credentials = Credentials::new(
            config.access_key.clone(),
            config.secret_key.clone(),
            None,
            None,
            "inkpress-config",
        );

        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .credentials_provider(credentials)
            .load()
            .await;

        let mut builder = aws_sdk_s3::config::Builder::from(&sdk_config);
        if !config.endpoint.is_empty() {
            // R2 and MinIO do not resolve virtual-hosted bucket subdomains.
            builder = builder
                .endpoint_url(config.endpoint.clone())
                .force_path_style(true);
        }

        tracing::info!(
            bucket = %config.bucket,
            region = %config.region,
            endpoint = %config.endpoint,
            "Initializing S3 storage provider"
        );

        Ok(Self {
            client: Client::from_conf(builder.build()),
            bucket: config.bucket.clone(),
            provider_name,
        })
    }
}

/// Whether an SDK failure is worth retrying: transport-level failures and
/// 5xx service responses are, 4xx responses are not.
fn is_retryable<E>(err: &SdkError<E>) -> bool {
    match err {
        SdkError::TimeoutError(_) | SdkError::DispatchFailure(_) | SdkError::ResponseError(_) => {
            true
        }
        SdkError::ServiceError(ctx) => ctx.raw().status().as_u16() >= 500,
        _ => false,
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    fn provider_type(&self) -> &str {
        self.provider_name
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(self
            .client
            .head_bucket()
            .bucket(&self.bucket)
            .send()
            .await
            .is_ok())
    }

    async fn put_object(
        &self,
        key: &str,
        content_type: Option<&str>,
        data: Bytes,
    ) -> AppResult<PutResult> {
        keys::validate(key)?;
        let size = data.len() as u64;

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .set_content_type(content_type.map(str::to_string))
            .body(SdkByteStream::from(data))
            .send()
            .await
            .map_err(|e| {
                let retryable = is_retryable(&e);
                AppError::with_source(
                    ErrorKind::StorageWrite,
                    format!("S3 put failed for object: {key}"),
                    e,
                )
                .retryable(retryable)
            })?;

        debug!(key, bytes = size, "Stored object in S3");
        Ok(PutResult { size })
    }

    async fn put_object_stream(
        &self,
        key: &str,
        content_type: Option<&str>,
        stream: ByteStream,
    ) -> AppResult<PutResult> {
        keys::validate(key)?;
        // PutObject needs a known content length, so the stream is buffered.
        let chunks: Vec<Bytes> = stream.try_collect().await.map_err(|e| {
            AppError::with_source(ErrorKind::StorageWrite, "Upload stream read error", e)
                .retryable(true)
        })?;
        self.put_object(key, content_type, Bytes::from(chunks.concat()))
            .await
    }

    async fn get_object(&self, key: &str) -> AppResult<ObjectDownload> {
        keys::validate(key)?;

        let resp = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| match &e {
                SdkError::ServiceError(ctx) if ctx.err().is_no_such_key() => {
                    AppError::not_found(format!("Object not found: {key}"))
                }
                _ => {
                    let retryable = is_retryable(&e);
                    AppError::with_source(
                        ErrorKind::StorageRead,
                        format!("S3 get failed for object: {key}"),
                        e,
                    )
                    .retryable(retryable)
                }
            })?;

        let content_length = resp.content_length().unwrap_or_default().max(0) as u64;
        let content_type = resp.content_type().map(str::to_string);
        let stream = ReaderStream::new(resp.body.into_async_read());

        Ok(ObjectDownload {
            stream: Box::pin(stream),
            content_type,
            content_length,
        })
    }

    async fn delete_object(&self, key: &str) -> AppResult<()> {
        keys::validate(key)?;

        // DeleteObject succeeds on missing keys, which matches the contract.
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                let retryable = is_retryable(&e);
                AppError::with_source(
                    ErrorKind::StorageWrite,
                    format!("S3 delete failed for object: {key}"),
                    e,
                )
                .retryable(retryable)
            })?;

        Ok(())
    }
}
