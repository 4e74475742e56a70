//! Media storage provider configuration.

use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::result::AppResult;

/// Available storage backends.
///
/// `r2` is Cloudflare R2, which speaks the S3 API; it shares the S3
/// provider implementation but requires an explicit endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageProviderKind {
    /// Local filesystem under a configured root directory.
    Local,
    /// In-process memory, no configuration required.
    Memory,
    /// AWS S3 or any S3-compatible endpoint (MinIO, etc.).
    S3,
    /// Cloudflare R2 via its S3-compatible API.
    R2,
    /// Google Cloud Storage via the JSON API.
    Gcs,
}

impl StorageProviderKind {
    /// Stable lowercase name, matching the config file value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Memory => "memory",
            Self::S3 => "s3",
            Self::R2 => "r2",
            Self::Gcs => "gcs",
        }
    }
}

/// Top-level storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Which backend stores media objects.
    #[serde(default = "default_provider")]
    pub provider: StorageProviderKind,
    /// Local filesystem settings.
    #[serde(default)]
    pub local: LocalStorageConfig,
    /// S3-compatible settings (also used for `r2`).
    #[serde(default)]
    pub s3: S3StorageConfig,
    /// Google Cloud Storage settings.
    #[serde(default)]
    pub gcs: GcsStorageConfig,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            local: LocalStorageConfig::default(),
            s3: S3StorageConfig::default(),
            gcs: GcsStorageConfig::default(),
        }
    }
}

/// Local filesystem storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalStorageConfig {
    /// Root directory for stored media.
    #[serde(default = "default_local_root")]
    pub root_path: String,
}

impl Default for LocalStorageConfig {
    fn default() -> Self {
        Self {
            root_path: default_local_root(),
        }
    }
}

/// S3-compatible object storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct S3StorageConfig {
    /// Bucket name.
    #[serde(default)]
    pub bucket: String,
    /// AWS region (ignored by R2, which uses "auto").
    #[serde(default = "default_region")]
    pub region: String,
    /// Endpoint URL for non-AWS services (MinIO, R2).
    #[serde(default)]
    pub endpoint: String,
    /// Access key ID.
    #[serde(default)]
    pub access_key: String,
    /// Secret access key.
    #[serde(default)]
    pub secret_key: String,
}

impl Default for S3StorageConfig {
    fn default() -> Self {
        Self {
            bucket: String::new(),
            region: default_region(),
            endpoint: String::new(),
            access_key: String::new(),
            secret_key: String::new(),
        }
    }
}

/// Google Cloud Storage configuration (service-account credentials).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GcsStorageConfig {
    /// Bucket name.
    #[serde(default)]
    pub bucket: String,
    /// GCP project ID.
    #[serde(default)]
    pub project_id: String,
    /// Service account email.
    #[serde(default)]
    pub client_email: String,
    /// Service account RSA private key, PEM-encoded.
    #[serde(default)]
    pub private_key: String,
}

impl StorageConfig {
    /// Validate that every field the selected provider requires is present.
    ///
    /// Fails with a configuration error naming all missing fields at once,
    /// so a misconfigured deployment reports the full fix in one pass.
    pub fn validate(&self) -> AppResult<()> {
        let mut missing: Vec<&str> = Vec::new();

        match self.provider {
            StorageProviderKind::Memory => {}
            StorageProviderKind::Local => {
                if self.local.root_path.is_empty() {
                    missing.push("storage.local.root_path");
                }
            }
            StorageProviderKind::S3 | StorageProviderKind::R2 => {
                if self.s3.bucket.is_empty() {
                    missing.push("storage.s3.bucket");
                }
                if self.s3.access_key.is_empty() {
                    missing.push("storage.s3.access_key");
                }
                if self.s3.secret_key.is_empty() {
                    missing.push("storage.s3.secret_key");
                }
                if self.provider == StorageProviderKind::R2 && self.s3.endpoint.is_empty() {
                    missing.push("storage.s3.endpoint");
                }
            }
            StorageProviderKind::Gcs => {
                if self.gcs.bucket.is_empty() {
                    missing.push("storage.gcs.bucket");
                }
                if self.gcs.project_id.is_empty() {
                    missing.push("storage.gcs.project_id");
                }
                if self.gcs.client_email.is_empty() {
                    missing.push("storage.gcs.client_email");
                }
                if self.gcs.private_key.is_empty() {
                    missing.push("storage.gcs.private_key");
                }
            }
        }

        if missing.is_empty() {
            Ok(())
        } else {
            Err(AppError::configuration(format!(
                "Storage provider '{}' is missing required configuration: {}",
                self.provider.as_str(),
                missing.join(", ")
            )))
        }
    }
}

fn default_provider() -> StorageProviderKind {
    StorageProviderKind::Local
}

fn default_local_root() -> String {
    "./data/media".to_string()
}

fn default_region() -> String {
    "us-east-1".to_string()
}
