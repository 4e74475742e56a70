//! Unified application error types for Inkpress.
//!
//! All crates map their internal errors into [`AppError`] for consistent
//! propagation through the ? operator.

use std::fmt;
use thiserror::Error;

/// Top-level error kind categorization used across the entire application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// The requested object was not found.
    NotFound,
    /// Input validation failed (bad object key, malformed request).
    Validation,
    /// A configuration error occurred (missing provider fields, bad files).
    Configuration,
    /// A rate limit was exceeded.
    RateLimited,
    /// A storage read failed for a reason other than a missing key.
    StorageRead,
    /// A storage write failed (disk full, permission denied, network failure).
    StorageWrite,
    /// A serialization/deserialization error occurred.
    Serialization,
    /// An internal server error occurred.
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "NOT_FOUND"),
            Self::Validation => write!(f, "VALIDATION_ERROR"),
            Self::Configuration => write!(f, "CONFIGURATION_ERROR"),
            Self::RateLimited => write!(f, "RATE_LIMITED"),
            Self::StorageRead => write!(f, "STORAGE_READ_ERROR"),
            Self::StorageWrite => write!(f, "STORAGE_WRITE_ERROR"),
            Self::Serialization => write!(f, "SERIALIZATION_ERROR"),
            Self::Internal => write!(f, "INTERNAL_ERROR"),
        }
    }
}

/// The unified application error used throughout Inkpress.
///
/// All crate-specific errors are mapped into `AppError` using `From` impls
/// or explicit `.map_err()` calls. Storage errors additionally carry a
/// `retryable` flag: transient provider-side failures (timeouts, 5xx
/// responses, dropped connections) are retryable, configuration and
/// validation failures are not. The HTTP boundary maps retryable errors to
/// 503 and non-retryable ones to 500; no retry happens below the boundary.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// The category of error.
    pub kind: ErrorKind,
    /// A human-readable error message.
    pub message: String,
    /// Whether the underlying failure is transient and worth retrying.
    pub retryable: bool,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new application error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            retryable: false,
            source: None,
        }
    }

    /// Create a new application error with an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            retryable: false,
            source: Some(Box::new(source)),
        }
    }

    /// Mark this error as retryable (or not).
    pub fn retryable(mut self, retryable: bool) -> Self {
        self.retryable = retryable;
        self
    }

    /// Create a not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Create a rate-limited error.
    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::RateLimited, message)
    }

    /// Create a storage-read error.
    pub fn storage_read(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::StorageRead, message)
    }

    /// Create a storage-write error.
    pub fn storage_write(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::StorageWrite, message)
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            retryable: self.retryable,
            source: None,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(
            ErrorKind::Serialization,
            format!("JSON serialization error: {err}"),
            err,
        )
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Configuration error: {err}"),
            err,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(ErrorKind::NotFound.to_string(), "NOT_FOUND");
        assert_eq!(ErrorKind::StorageWrite.to_string(), "STORAGE_WRITE_ERROR");
        assert_eq!(ErrorKind::Validation.to_string(), "VALIDATION_ERROR");
    }

    #[test]
    fn test_retryable_defaults_false() {
        let err = AppError::storage_write("disk full");
        assert!(!err.retryable);
        let err = err.retryable(true);
        assert!(err.retryable);
    }
}
