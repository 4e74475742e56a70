//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use inkpress_core::config::AppConfig;
use inkpress_core::traits::storage::ObjectStore;

use crate::middleware::rate_limit::SlidingWindowLimiter;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`. The object store is
/// constructed once at startup by the factory and injected here; there is
/// no ambient global, so tests build their own state for isolation.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// Media object store.
    pub store: Arc<dyn ObjectStore>,
    /// Sliding-window rate limiter for media routes.
    pub rate_limiter: Arc<SlidingWindowLimiter>,
}

impl AppState {
    /// Assemble state from its constructed parts.
    pub fn new(config: AppConfig, store: Arc<dyn ObjectStore>) -> Self {
        let rate_limiter = Arc::new(SlidingWindowLimiter::from_config(&config.rate_limit));
        Self {
            config: Arc::new(config),
            store,
            rate_limiter,
        }
    }
}
