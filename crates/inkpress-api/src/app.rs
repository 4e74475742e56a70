//! Application builder — wires router + middleware + state into an Axum app.

use axum::Router;
use std::future::Future;
use std::sync::Arc;

use inkpress_core::config::AppConfig;
use inkpress_core::error::AppError;
use inkpress_core::traits::storage::ObjectStore;

use crate::middleware::cors::build_cors_layer;
use crate::router::build_router;
use crate::state::AppState;

/// Builds the complete Axum application with all routes and middleware.
pub fn build_app(state: AppState) -> Router {
    let cors = build_cors_layer(&state.config.cors);
    build_router(state).layer(cors)
}

/// Runs the Inkpress server until the shutdown future resolves.
pub async fn run_server(
    config: AppConfig,
    store: Arc<dyn ObjectStore>,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(), AppError> {
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState::new(config, store);
    let app = build_app(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    tracing::info!(addr = %addr, "Inkpress media service listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown)
    .await
    .map_err(|e| AppError::internal(format!("Server error: {e}")))
}
