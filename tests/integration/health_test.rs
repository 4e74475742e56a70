//! Integration tests for the health endpoint.

use http::StatusCode;

use crate::helpers::TestApp;

#[tokio::test]
async fn test_health_reports_provider() {
    let app = TestApp::new().await;

    let response = app.request("GET", "/api/health", &[], None).await;

    assert_eq!(response.status, StatusCode::OK);
    let body = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["provider"], "memory");
    assert_eq!(body["data"]["healthy"], true);
    assert_eq!(body["data"]["status"], "ok");
}
