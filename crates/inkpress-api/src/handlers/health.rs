//! Health check handlers.

use axum::Json;
use axum::extract::State;

use crate::dto::response::{ApiResponse, HealthResponse};
use crate::state::AppState;

/// GET /api/health
pub async fn health(State(state): State<AppState>) -> Json<ApiResponse<HealthResponse>> {
    let healthy = state.store.health_check().await.unwrap_or(false);

    Json(ApiResponse::ok(HealthResponse {
        status: if healthy { "ok" } else { "degraded" }.to_string(),
        provider: state.store.provider_type().to_string(),
        healthy,
        version: env!("CARGO_PKG_VERSION").to_string(),
    }))
}
