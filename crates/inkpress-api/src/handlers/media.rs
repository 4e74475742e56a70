//! Media upload, download, and delete handlers.

use axum::Json;
use axum::body::Body;
use axum::extract::{Multipart, Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::Response;
use bytes::Bytes;
use futures::TryStreamExt;
use uuid::Uuid;

use inkpress_core::error::AppError;

use crate::dto::response::{ApiResponse, MediaUploadResponse};
use crate::error::ApiError;
use crate::state::AppState;

/// POST /api/media
///
/// Multipart upload. The `file` field carries the media; an optional `key`
/// field overrides the generated object key.
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<MediaUploadResponse>>), ApiError> {
    let mut explicit_key: Option<String> = None;
    let mut file: Option<(Option<String>, Option<String>, Bytes)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::validation(format!("Malformed multipart body: {e}")))?
    {
        match field.name() {
            Some("key") => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| AppError::validation(format!("Unreadable key field: {e}")))?;
                explicit_key = Some(value);
            }
            Some("file") => {
                let filename = field.file_name().map(str::to_string);
                let content_type = field.content_type().map(str::to_string);
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::validation(format!("Unreadable file field: {e}")))?;
                file = Some((filename, content_type, data));
            }
            _ => {}
        }
    }

    let (filename, content_type, data) =
        file.ok_or_else(|| AppError::validation("Multipart upload requires a 'file' field"))?;

    let key = explicit_key.unwrap_or_else(|| derive_key(filename.as_deref()));

    let result = state
        .store
        .put_object(&key, content_type.as_deref(), data)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(MediaUploadResponse {
            key,
            size: result.size,
            content_type,
        })),
    ))
}

/// PUT /api/media/{*key}
///
/// Raw streaming upload of the request body under the given key.
pub async fn upload_raw(
    State(state): State<AppState>,
    Path(key): Path<String>,
    headers: HeaderMap,
    body: Body,
) -> Result<Json<ApiResponse<MediaUploadResponse>>, ApiError> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let stream = body.into_data_stream().map_err(std::io::Error::other);

    let result = state
        .store
        .put_object_stream(&key, content_type.as_deref(), Box::pin(stream))
        .await?;

    Ok(Json(ApiResponse::ok(MediaUploadResponse {
        key,
        size: result.size,
        content_type,
    })))
}

/// GET /api/media/{*key}
pub async fn download(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Response, ApiError> {
    let object = state.store.get_object(&key).await?;

    let content_type = object
        .content_type
        .unwrap_or_else(|| "application/octet-stream".to_string());

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_LENGTH, object.content_length)
        .body(Body::from_stream(object.stream))
        .map_err(|e| AppError::internal(format!("Response build failed: {e}")))?;

    Ok(response)
}

/// DELETE /api/media/{*key}
///
/// Always 204: deleting a missing object is not an error.
pub async fn remove(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.store.delete_object(&key).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Derive an object key for an upload without an explicit one.
fn derive_key(filename: Option<&str>) -> String {
    // Keep only the final path segment of a client-supplied filename.
    let name = filename
        .and_then(|f| f.rsplit(['/', '\\']).next())
        .filter(|f| !f.is_empty())
        .unwrap_or("blob");
    format!("uploads/{}/{name}", Uuid::new_v4())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_key_strips_client_paths() {
        let key = derive_key(Some("C:\\photos\\cat.png"));
        assert!(key.starts_with("uploads/"));
        assert!(key.ends_with("/cat.png"));

        let key = derive_key(Some("../../evil.sh"));
        assert!(key.ends_with("/evil.sh"));
        assert!(!key.contains(".."));
    }

    #[test]
    fn test_derive_key_without_filename() {
        assert!(derive_key(None).ends_with("/blob"));
        assert!(derive_key(Some("")).ends_with("/blob"));
    }
}
