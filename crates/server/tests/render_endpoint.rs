//! Render endpoint, health and metrics routes.

mod common;

use axum::http::StatusCode;
use textshot_core::ArtifactCache;

use common::TestFixture;

#[tokio::test]
async fn test_render_cached_text() {
    let fixture = TestFixture::new();
    fixture.cache.store_text("42", "hello").await.unwrap();

    let response = fixture.get("/42").await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response
        .content_type
        .as_deref()
        .is_some_and(|ct| ct.starts_with("text/html")));
    assert_eq!(response.body, "<html><body><p>hello</p></body></html>");
}

#[tokio::test]
async fn test_render_is_idempotent() {
    let fixture = TestFixture::new();
    fixture.cache.store_text("7", "same every time").await.unwrap();

    let first = fixture.get("/7").await;
    let second = fixture.get("/7").await;

    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(first.body, second.body);
}

#[tokio::test]
async fn test_render_missing_text_returns_empty_body() {
    let fixture = TestFixture::new();

    let response = fixture.get("/999").await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.is_empty());
}

#[tokio::test]
async fn test_render_cache_read_failure_returns_empty_body() {
    let fixture = TestFixture::new();
    fixture.cache.store_text("42", "hello").await.unwrap();
    fixture.cache.set_fail_text_reads(true);

    let response = fixture.get("/42").await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.is_empty());
}

#[tokio::test]
async fn test_render_escapes_markup() {
    let fixture = TestFixture::new();
    fixture
        .cache
        .store_text("3", "<script>alert('x')</script> & more")
        .await
        .unwrap();

    let response = fixture.get("/3").await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(!response.body.contains("<script>"));
    assert!(response.body.contains("&lt;script&gt;"));
    assert!(response.body.contains("&amp; more"));
}

#[tokio::test]
async fn test_render_uses_latest_text() {
    let fixture = TestFixture::new();
    fixture.cache.store_text("5", "first").await.unwrap();
    fixture.cache.store_text("5", "second").await.unwrap();

    let response = fixture.get("/5").await;

    assert!(response.body.contains("second"));
    assert!(!response.body.contains("first"));
}

#[tokio::test]
async fn test_render_template_error_is_server_error() {
    // Compiles, but fails at render time on the undefined call.
    let fixture = TestFixture::with_template("{{ missing_fn(text) }}");
    fixture.cache.store_text("1", "hello").await.unwrap();

    let response = fixture.get("/1").await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_health() {
    let fixture = TestFixture::new();

    let response = fixture.get("/health").await;

    assert_eq!(response.status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&response.body).unwrap();
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn test_metrics_exposes_http_requests() {
    let fixture = TestFixture::new();
    fixture.get("/health").await;

    let response = fixture.get("/metrics").await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("textshot_http_requests_total"));
    assert!(response.body.contains("path=\"/health\""));
}
