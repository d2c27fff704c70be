//! Common test utilities for exercising the router in-process.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use textshot_core::{testing::MockCache, PageTemplate};
use textshot_server::{api::create_router, state::AppState};

/// Template used by the fixture unless a test supplies its own.
pub const TEST_TEMPLATE: &str = "<html><body><p>{{ text }}</p></body></html>";

/// In-process router backed by a mock cache.
pub struct TestFixture {
    pub router: Router,
    pub cache: MockCache,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub content_type: Option<String>,
    pub body: String,
}

impl TestFixture {
    pub fn new() -> Self {
        Self::with_template(TEST_TEMPLATE)
    }

    pub fn with_template(source: &str) -> Self {
        let cache = MockCache::new();
        let template = PageTemplate::from_source(source).expect("Failed to compile template");
        let state = Arc::new(AppState::new(Arc::new(cache.clone()), Arc::new(template)));

        Self {
            router: create_router(state),
            cache,
        }
    }

    /// Send a GET request to the router.
    pub async fn get(&self, path: &str) -> TestResponse {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .body(Body::empty())
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to execute request");

        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to read body")
            .to_bytes();

        TestResponse {
            status,
            content_type,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        }
    }
}
