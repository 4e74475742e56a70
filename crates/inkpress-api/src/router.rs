//! Route definitions for the Inkpress HTTP API.
//!
//! All routes are mounted under `/api`. The router receives `AppState` and
//! passes it to all handlers via Axum's `State` extractor.

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{delete, get, post, put},
};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let max_upload = body_limit(state.config.server.max_upload_size_bytes);

    let api_routes = Router::new().merge(media_routes(&state)).merge(health_routes());

    Router::new()
        .nest("/api", api_routes)
        .layer(DefaultBodyLimit::max(max_upload))
        .layer(TraceLayer::new_for_http())
        .layer(axum_middleware::from_fn(
            middleware::logging::request_logging,
        ))
        .with_state(state)
}

/// Media upload, download, delete — rate limited.
fn media_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/media", post(handlers::media::upload))
        .route("/media/{*key}", put(handlers::media::upload_raw))
        .route("/media/{*key}", get(handlers::media::download))
        .route("/media/{*key}", delete(handlers::media::remove))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::rate_limit::rate_limit,
        ))
}

/// Liveness and provider health.
fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}

/// Convert the configured byte limit to the body-limit type, saturating on
/// 32-bit targets instead of truncating.
fn body_limit(bytes: u64) -> usize {
    usize::try_from(bytes).unwrap_or(usize::MAX)
}
