//! Maps domain `AppError` to HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use inkpress_core::error::{AppError, ErrorKind};

/// Standard API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// Machine-readable error code.
    pub error: String,
    /// Human-readable message.
    pub message: String,
    /// Whether retrying the request later may succeed.
    pub retryable: bool,
}

/// Wrapper so `AppError` can flow out of handlers through `?`.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = self.0;
        // Retryable storage failures are the provider's problem, not the
        // request's: surface them as 503 so clients back off and retry.
        let status = match err.kind {
            ErrorKind::Validation => StatusCode::BAD_REQUEST,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ErrorKind::StorageRead | ErrorKind::StorageWrite | ErrorKind::Internal
                if err.retryable =>
            {
                StatusCode::SERVICE_UNAVAILABLE
            }
            ErrorKind::StorageRead
            | ErrorKind::StorageWrite
            | ErrorKind::Configuration
            | ErrorKind::Serialization
            | ErrorKind::Internal => {
                tracing::error!(error = %err, "Request failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = ApiErrorResponse {
            error: err.kind.to_string(),
            message: err.message,
            retryable: err.retryable,
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: AppError) -> StatusCode {
        ApiError(err).into_response().status()
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            status_of(AppError::validation("bad key")),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(AppError::not_found("missing")),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(AppError::rate_limited("slow down")),
            StatusCode::TOO_MANY_REQUESTS
        );
    }

    #[test]
    fn test_retryable_flag_selects_503() {
        assert_eq!(
            status_of(AppError::storage_write("network blip").retryable(true)),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            status_of(AppError::storage_write("permission denied")),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_of(AppError::storage_read("socket reset").retryable(true)),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }
}
