//! Google Cloud Storage provider.
//!
//! Talks to the GCS JSON API directly over HTTP. Authentication follows the
//! service-account flow: an RS256-signed JWT is exchanged at Google's token
//! endpoint for a bearer token, which is cached until shortly before expiry.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::debug;

use inkpress_core::config::storage::GcsStorageConfig;
use inkpress_core::error::{AppError, ErrorKind};
use inkpress_core::keys;
use inkpress_core::result::AppResult;
use inkpress_core::traits::storage::{ByteStream, ObjectDownload, ObjectStore, PutResult};

const TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const STORAGE_SCOPE: &str = "https://www.googleapis.com/auth/devstorage.read_write";
const API_BASE: &str = "https://storage.googleapis.com";

/// Seconds of validity requested per token, and the slack before expiry at
/// which a cached token is considered stale.
const TOKEN_LIFETIME_SECS: i64 = 3600;
const TOKEN_EXPIRY_SLACK_SECS: i64 = 60;

#[derive(Serialize)]
struct TokenClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

struct CachedToken {
    value: String,
    expires_at: DateTime<Utc>,
}

/// Google Cloud Storage provider.
pub struct GcsObjectStore {
    http: reqwest::Client,
    bucket: String,
    client_email: String,
    signing_key: EncodingKey,
    token: Mutex<Option<CachedToken>>,
}

impl std::fmt::Debug for GcsObjectStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GcsObjectStore")
            .field("bucket", &self.bucket)
            .field("client_email", &self.client_email)
            .finish_non_exhaustive()
    }
}

impl GcsObjectStore {
    /// Create a new GCS store from validated configuration.
    ///
    /// Fails immediately if the service-account private key is not valid
    /// RSA PEM, so a bad credential surfaces at startup.
    pub fn new(config: &GcsStorageConfig) -> AppResult<Self> {
        // Keys injected through environment variables usually carry
        // escaped newlines.
        let pem = config.private_key.replace("\\n", "\n");
        let signing_key = EncodingKey::from_rsa_pem(pem.as_bytes()).map_err(|e| {
            AppError::with_source(
                ErrorKind::Configuration,
                "storage.gcs.private_key is not a valid RSA PEM key",
                e,
            )
        })?;

        tracing::info!(
            bucket = %config.bucket,
            project_id = %config.project_id,
            client_email = %config.client_email,
            "Initializing GCS storage provider"
        );

        Ok(Self {
            http: reqwest::Client::new(),
            bucket: config.bucket.clone(),
            client_email: config.client_email.clone(),
            signing_key,
            token: Mutex::new(None),
        })
    }

    fn object_url(&self, key: &str) -> String {
        format!(
            "{API_BASE}/storage/v1/b/{}/o/{}",
            self.bucket,
            urlencoding::encode(key)
        )
    }

    fn upload_url(&self, key: &str) -> String {
        format!(
            "{API_BASE}/upload/storage/v1/b/{}/o?uploadType=media&name={}",
            self.bucket,
            urlencoding::encode(key)
        )
    }

    /// Return a valid bearer token, refreshing it when stale.
    async fn access_token(&self) -> AppResult<String> {
        let mut cached = self.token.lock().await;

        if let Some(token) = cached.as_ref() {
            let remaining = token.expires_at - Utc::now();
            if remaining.num_seconds() > TOKEN_EXPIRY_SLACK_SECS {
                return Ok(token.value.clone());
            }
        }

        let now = Utc::now().timestamp();
        let claims = TokenClaims {
            iss: &self.client_email,
            scope: STORAGE_SCOPE,
            aud: TOKEN_URI,
            iat: now,
            exp: now + TOKEN_LIFETIME_SECS,
        };
        let assertion = encode(&Header::new(Algorithm::RS256), &claims, &self.signing_key)
            .map_err(|e| AppError::with_source(ErrorKind::Internal, "Failed to sign token grant", e))?;

        let resp = self
            .http
            .post(TOKEN_URI)
            .form(&[
                ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                ("assertion", assertion.as_str()),
            ])
            .send()
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Internal, "GCS token request failed", e)
                    .retryable(true)
            })?;

        if !resp.status().is_success() {
            let status = resp.status();
            return Err(if status_retryable(status) {
                AppError::internal(format!("GCS token endpoint returned {status}")).retryable(true)
            } else {
                // Credentials rejected; retrying will not help.
                AppError::configuration(format!("GCS rejected service-account grant: {status}"))
            });
        }

        let token: TokenResponse = resp.json().await.map_err(|e| {
            AppError::with_source(ErrorKind::Serialization, "Malformed GCS token response", e)
        })?;

        let value = token.access_token.clone();
        *cached = Some(CachedToken {
            value: token.access_token,
            expires_at: Utc::now() + chrono::Duration::seconds(token.expires_in),
        });
        Ok(value)
    }
}

/// 5xx and 429 responses are transient on Google's side.
fn status_retryable(status: StatusCode) -> bool {
    status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS
}

/// A token-grant failure hit during a storage operation reports that
/// operation's error kind. Configuration errors keep their kind: rejected
/// credentials are a deployment problem, not a storage fault.
fn token_error_as(mut err: AppError, kind: ErrorKind) -> AppError {
    if err.kind != ErrorKind::Configuration {
        err.kind = kind;
    }
    err
}

#[async_trait]
impl ObjectStore for GcsObjectStore {
    fn provider_type(&self) -> &str {
        "gcs"
    }

    async fn health_check(&self) -> AppResult<bool> {
        let token = self.access_token().await?;
        let resp = self
            .http
            .get(format!("{API_BASE}/storage/v1/b/{}", self.bucket))
            .bearer_auth(token)
            .send()
            .await;
        Ok(matches!(resp, Ok(r) if r.status().is_success()))
    }

    async fn put_object(
        &self,
        key: &str,
        content_type: Option<&str>,
        data: Bytes,
    ) -> AppResult<PutResult> {
        keys::validate(key)?;
        let token = self
            .access_token()
            .await
            .map_err(|e| token_error_as(e, ErrorKind::StorageWrite))?;
        let size = data.len() as u64;

        let mut request = self
            .http
            .post(self.upload_url(key))
            .bearer_auth(token)
            .body(data);
        if let Some(content_type) = content_type {
            request = request.header(reqwest::header::CONTENT_TYPE, content_type);
        }

        let resp = request.send().await.map_err(|e| {
            AppError::with_source(
                ErrorKind::StorageWrite,
                format!("GCS upload failed for object: {key}"),
                e,
            )
            .retryable(true)
        })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(AppError::storage_write(format!(
                "GCS upload for object '{key}' returned {status}"
            ))
            .retryable(status_retryable(status)));
        }

        debug!(key, bytes = size, "Stored object in GCS");
        Ok(PutResult { size })
    }

    async fn put_object_stream(
        &self,
        key: &str,
        content_type: Option<&str>,
        stream: ByteStream,
    ) -> AppResult<PutResult> {
        keys::validate(key)?;
        // Media uploads need a content length, so the stream is buffered.
        let chunks: Vec<Bytes> = stream.try_collect().await.map_err(|e| {
            AppError::with_source(ErrorKind::StorageWrite, "Upload stream read error", e)
                .retryable(true)
        })?;
        self.put_object(key, content_type, Bytes::from(chunks.concat()))
            .await
    }

    async fn get_object(&self, key: &str) -> AppResult<ObjectDownload> {
        keys::validate(key)?;
        let token = self
            .access_token()
            .await
            .map_err(|e| token_error_as(e, ErrorKind::StorageRead))?;

        let resp = self
            .http
            .get(format!("{}?alt=media", self.object_url(key)))
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::StorageRead,
                    format!("GCS download failed for object: {key}"),
                    e,
                )
                .retryable(true)
            })?;

        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            return Err(AppError::not_found(format!("Object not found: {key}")));
        }
        if !status.is_success() {
            return Err(AppError::storage_read(format!(
                "GCS download for object '{key}' returned {status}"
            ))
            .retryable(status_retryable(status)));
        }

        let content_length = resp.content_length().unwrap_or(0);
        let content_type = resp
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let stream = resp.bytes_stream().map_err(std::io::Error::other);

        Ok(ObjectDownload {
            stream: Box::pin(stream),
            content_type,
            content_length,
        })
    }

    async fn delete_object(&self, key: &str) -> AppResult<()> {
        keys::validate(key)?;
        let token = self
            .access_token()
            .await
            .map_err(|e| token_error_as(e, ErrorKind::StorageWrite))?;

        let resp = self
            .http
            .delete(self.object_url(key))
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::StorageWrite,
                    format!("GCS delete failed for object: {key}"),
                    e,
                )
                .retryable(true)
            })?;

        let status = resp.status();
        // Deleting a missing object is a no-op per the contract.
        if status.is_success() || status == StatusCode::NOT_FOUND {
            Ok(())
        } else {
            Err(AppError::storage_write(format!(
                "GCS delete for object '{key}' returned {status}"
            ))
            .retryable(status_retryable(status)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> GcsStorageConfig {
        GcsStorageConfig {
            bucket: "inkpress-media".to_string(),
            project_id: "inkpress".to_string(),
            client_email: "svc@inkpress.iam.gserviceaccount.com".to_string(),
            private_key: String::new(),
        }
    }

    #[test]
    fn test_invalid_pem_fails_at_construction() {
        let mut config = test_config();
        config.private_key = "not a pem".to_string();
        let err = GcsObjectStore::new(&config).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Configuration);
    }

    #[test]
    fn test_object_names_are_url_encoded() {
        // Slashes in object names must be percent-encoded in the JSON API.
        assert_eq!(
            urlencoding::encode("2026/08/cover.png"),
            "2026%2F08%2Fcover.png"
        );
    }

    #[test]
    fn test_token_outage_reports_storage_kind() {
        // A transient token-endpoint failure during a read or write must
        // surface in the storage taxonomy, keeping its retryable flag.
        let err = AppError::internal("GCS token endpoint returned 503").retryable(true);
        let err = token_error_as(err, ErrorKind::StorageRead);
        assert_eq!(err.kind, ErrorKind::StorageRead);
        assert!(err.retryable);

        let err = AppError::internal("GCS token request failed").retryable(true);
        let err = token_error_as(err, ErrorKind::StorageWrite);
        assert_eq!(err.kind, ErrorKind::StorageWrite);
        assert!(err.retryable);
    }

    #[test]
    fn test_rejected_credentials_stay_configuration() {
        let err = AppError::configuration("GCS rejected service-account grant: 403");
        let err = token_error_as(err, ErrorKind::StorageRead);
        assert_eq!(err.kind, ErrorKind::Configuration);
        assert!(!err.retryable);
    }

    #[test]
    fn test_status_classification() {
        assert!(status_retryable(StatusCode::INTERNAL_SERVER_ERROR));
        assert!(status_retryable(StatusCode::TOO_MANY_REQUESTS));
        assert!(!status_retryable(StatusCode::FORBIDDEN));
        assert!(!status_retryable(StatusCode::BAD_REQUEST));
    }
}
