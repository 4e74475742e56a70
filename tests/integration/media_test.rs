//! Integration tests for media upload, download, and delete.

use http::StatusCode;

use crate::helpers::TestApp;

#[tokio::test]
async fn test_raw_upload_download_roundtrip() {
    let app = TestApp::new().await;
    let payload = b"\x89PNG fake image bytes".to_vec();

    let response = app
        .request(
            "PUT",
            "/api/media/posts/1/cover.png",
            &[("content-type", "image/png")],
            Some(payload.clone()),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    let body = response.json();
    assert_eq!(body["data"]["key"], "posts/1/cover.png");
    assert_eq!(body["data"]["size"], payload.len() as u64);

    let response = app
        .request("GET", "/api/media/posts/1/cover.png", &[], None)
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.headers["content-type"], "image/png");
    assert_eq!(
        response.headers["content-length"],
        payload.len().to_string().as_str()
    );
    assert_eq!(response.body.as_ref(), payload.as_slice());
}

#[tokio::test]
async fn test_multipart_upload_with_explicit_key() {
    let app = TestApp::new().await;

    let boundary = "inkpress-test-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"key\"\r\n\r\nposts/42/photo.jpg\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(
        format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"photo.jpg\"\r\nContent-Type: image/jpeg\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"jpeg bytes here");
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    let content_type = format!("multipart/form-data; boundary={boundary}");
    let response = app
        .request(
            "POST",
            "/api/media",
            &[("content-type", content_type.as_str())],
            Some(body),
        )
        .await;

    assert_eq!(response.status, StatusCode::CREATED);
    let body = response.json();
    assert_eq!(body["data"]["key"], "posts/42/photo.jpg");
    assert_eq!(body["data"]["content_type"], "image/jpeg");

    let response = app
        .request("GET", "/api/media/posts/42/photo.jpg", &[], None)
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body.as_ref(), b"jpeg bytes here");
}

#[tokio::test]
async fn test_multipart_upload_without_file_field() {
    let app = TestApp::new().await;

    let boundary = "b";
    let body = format!(
        "--{boundary}\r\nContent-Disposition: form-data; name=\"key\"\r\n\r\nk\r\n--{boundary}--\r\n"
    );
    let content_type = format!("multipart/form-data; boundary={boundary}");

    let response = app
        .request(
            "POST",
            "/api/media",
            &[("content-type", content_type.as_str())],
            Some(body.into_bytes()),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.json()["error"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_download_missing_is_not_found() {
    let app = TestApp::new().await;

    let response = app
        .request("GET", "/api/media/never/uploaded.webp", &[], None)
        .await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.json()["error"], "NOT_FOUND");
}

#[tokio::test]
async fn test_delete_is_idempotent() {
    let app = TestApp::new().await;

    app.request("PUT", "/api/media/tmp/x.bin", &[], Some(b"x".to_vec()))
        .await;

    let response = app.request("DELETE", "/api/media/tmp/x.bin", &[], None).await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);

    // A second delete of the now-missing key is still a success.
    let response = app.request("DELETE", "/api/media/tmp/x.bin", &[], None).await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);

    let response = app.request("GET", "/api/media/tmp/x.bin", &[], None).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_traversal_key_is_rejected() {
    let app = TestApp::new().await;

    let response = app
        .request(
            "PUT",
            "/api/media/..%2F..%2Fetc%2Fpasswd",
            &[],
            Some(b"pwned".to_vec()),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.json()["error"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_overwrite_returns_latest_body() {
    let app = TestApp::new().await;

    app.request("PUT", "/api/media/a.txt", &[], Some(b"first".to_vec()))
        .await;
    app.request("PUT", "/api/media/a.txt", &[], Some(b"second".to_vec()))
        .await;

    let response = app.request("GET", "/api/media/a.txt", &[], None).await;
    assert_eq!(response.body.as_ref(), b"second");
}
