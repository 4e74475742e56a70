//! Sliding-window rate limiter middleware.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{ConnectInfo, Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tokio::sync::Mutex;
use tokio::time::Instant;

use inkpress_core::config::rate_limit::RateLimitConfig;
use inkpress_core::error::AppError;

use crate::error::ApiError;
use crate::state::AppState;

/// Simple in-memory sliding-window rate limiter.
///
/// Each client key maps to the timestamps of its requests within the
/// trailing window. The limit is advisory: one async mutex guards the map,
/// but exact counting under heavy concurrency is not a hard guarantee, and
/// a denied request is rejected immediately rather than queued.
#[derive(Debug)]
pub struct SlidingWindowLimiter {
    /// Client key → request timestamps inside the window.
    entries: Mutex<LimiterState>,
    /// Maximum requests per key per window.
    max_requests: usize,
    /// Window length.
    window: Duration,
    /// Minimum interval between sweeps of emptied keys.
    sweep_interval: Duration,
}

#[derive(Debug)]
struct LimiterState {
    hits: HashMap<String, Vec<Instant>>,
    last_sweep: Instant,
}

impl SlidingWindowLimiter {
    /// Creates a new rate limiter.
    pub fn new(max_requests: usize, window: Duration, sweep_interval: Duration) -> Self {
        Self {
            entries: Mutex::new(LimiterState {
                hits: HashMap::new(),
                last_sweep: Instant::now(),
            }),
            max_requests,
            window,
            sweep_interval,
        }
    }

    /// Creates a rate limiter from configuration.
    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self::new(
            config.max_requests,
            Duration::from_secs(config.window_seconds),
            Duration::from_secs(config.sweep_interval_seconds),
        )
    }

    /// Records a request for `key` and returns whether it is allowed.
    ///
    /// Prunes timestamps older than the window first; the request is denied
    /// if the pruned count has already reached the maximum.
    pub async fn check(&self, key: &str) -> bool {
        let mut state = self.entries.lock().await;
        let now = Instant::now();

        // Opportunistic sweep so abandoned keys do not accumulate. Runs at
        // most once per sweep interval, inline rather than on a background
        // task.
        if now.duration_since(state.last_sweep) >= self.sweep_interval {
            let window = self.window;
            state
                .hits
                .retain(|_, stamps| stamps.iter().any(|t| now.duration_since(*t) < window));
            state.last_sweep = now;
        }

        let stamps = state.hits.entry(key.to_string()).or_default();
        stamps.retain(|t| now.duration_since(*t) < self.window);

        if stamps.len() >= self.max_requests {
            false
        } else {
            stamps.push(now);
            true
        }
    }

    /// Number of tracked keys. Test visibility only.
    pub async fn tracked_keys(&self) -> usize {
        self.entries.lock().await.hits.len()
    }
}

/// Axum middleware applying the limiter to media routes.
///
/// The client key is `ip:path`; the address comes from the first
/// `X-Forwarded-For` entry when present, else the peer address.
pub async fn rate_limit(State(state): State<AppState>, request: Request, next: Next) -> Response {
    if !state.config.rate_limit.enabled {
        return next.run(request).await;
    }

    let ip = request
        .headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .or_else(|| {
            request
                .extensions()
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| addr.ip().to_string())
        })
        .unwrap_or_else(|| "unknown".to_string());

    let key = format!("{ip}:{}", request.uri().path());

    if state.rate_limiter.check(&key).await {
        next.run(request).await
    } else {
        tracing::warn!(key, "Rate limit exceeded");
        ApiError(AppError::rate_limited("Too many requests")).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(max: usize) -> SlidingWindowLimiter {
        SlidingWindowLimiter::new(max, Duration::from_secs(300), Duration::from_secs(60))
    }

    #[tokio::test(start_paused = true)]
    async fn test_limit_boundary_is_exact() {
        let limiter = limiter(100);

        for _ in 0..100 {
            assert!(limiter.check("1.2.3.4:/api/media").await);
        }
        assert!(!limiter.check("1.2.3.4:/api/media").await);

        // Other keys are unaffected.
        assert!(limiter.check("5.6.7.8:/api/media").await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_window_elapses() {
        let limiter = limiter(2);

        assert!(limiter.check("k").await);
        assert!(limiter.check("k").await);
        assert!(!limiter.check("k").await);

        tokio::time::advance(Duration::from_secs(301)).await;
        assert!(limiter.check("k").await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_partial_window_slides() {
        let limiter = limiter(2);

        assert!(limiter.check("k").await);
        tokio::time::advance(Duration::from_secs(200)).await;
        assert!(limiter.check("k").await);
        assert!(!limiter.check("k").await);

        // The first hit has aged out; the second is still inside the window.
        tokio::time::advance(Duration::from_secs(150)).await;
        assert!(limiter.check("k").await);
        assert!(!limiter.check("k").await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweep_drops_empty_keys() {
        let limiter = limiter(10);

        limiter.check("a").await;
        limiter.check("b").await;
        assert_eq!(limiter.tracked_keys().await, 2);

        // Past the window and the sweep interval, a new request triggers
        // the sweep and only its own key remains.
        tokio::time::advance(Duration::from_secs(400)).await;
        limiter.check("c").await;
        assert_eq!(limiter.tracked_keys().await, 1);
    }
}
