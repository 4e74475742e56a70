//! Integration tests for the media rate limiter.

use http::StatusCode;

use crate::helpers::{TestApp, test_config};

fn limited_config(max_requests: usize) -> inkpress_core::config::AppConfig {
    let mut config = test_config();
    config.rate_limit.enabled = true;
    config.rate_limit.max_requests = max_requests;
    config.rate_limit.window_seconds = 300;
    config
}

#[tokio::test]
async fn test_limit_applies_per_client_and_path() {
    let app = TestApp::with_config(limited_config(3)).await;
    let ip = [("x-forwarded-for", "203.0.113.9")];

    for _ in 0..3 {
        let response = app.request("GET", "/api/media/missing.png", &ip, None).await;
        assert_eq!(response.status, StatusCode::NOT_FOUND);
    }

    let response = app.request("GET", "/api/media/missing.png", &ip, None).await;
    assert_eq!(response.status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(response.json()["error"], "RATE_LIMITED");

    // A different client address still gets through.
    let other = [("x-forwarded-for", "198.51.100.7")];
    let response = app
        .request("GET", "/api/media/missing.png", &other, None)
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    // So does the same client on a different path.
    let response = app.request("GET", "/api/media/other.png", &ip, None).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_health_is_not_rate_limited() {
    let app = TestApp::with_config(limited_config(1)).await;
    let ip = [("x-forwarded-for", "203.0.113.10")];

    for _ in 0..5 {
        let response = app.request("GET", "/api/health", &ip, None).await;
        assert_eq!(response.status, StatusCode::OK);
    }
}

#[tokio::test]
async fn test_disabled_limiter_passes_everything() {
    let app = TestApp::new().await;
    let ip = [("x-forwarded-for", "203.0.113.11")];

    for _ in 0..20 {
        let response = app.request("GET", "/api/media/missing.png", &ip, None).await;
        assert_eq!(response.status, StatusCode::NOT_FOUND);
    }
}
