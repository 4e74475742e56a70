//! Shared test helpers for integration tests.

use axum::Router;
use axum::body::Body;
use http::{HeaderMap, Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use inkpress_api::{AppState, build_app};
use inkpress_core::config::AppConfig;
use inkpress_core::config::storage::StorageProviderKind;

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
}

/// A collected test response
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: bytes::Bytes,
}

impl TestResponse {
    /// Parse the body as JSON
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("Response body is not JSON")
    }
}

/// Config backed by the in-memory provider, rate limiting off.
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.storage.provider = StorageProviderKind::Memory;
    config.rate_limit.enabled = false;
    config
}

impl TestApp {
    /// Create a test application with the default test config
    pub async fn new() -> Self {
        Self::with_config(test_config()).await
    }

    /// Create a test application with a custom config
    pub async fn with_config(config: AppConfig) -> Self {
        let store = inkpress_storage::build_store(&config.storage)
            .await
            .expect("Failed to build test store");
        let state = AppState::new(config, store);
        Self {
            router: build_app(state),
        }
    }

    /// Send a request through the router
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        headers: &[(&str, &str)],
        body: Option<Vec<u8>>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(path);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        let body = match body {
            Some(data) => Body::from(data),
            None => Body::empty(),
        };
        let request = builder.body(body).expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Request failed");

        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to collect body");

        TestResponse {
            status,
            headers,
            body,
        }
    }
}
