//! WebDriver renderer implementation.
//!
//! Speaks the W3C WebDriver protocol over HTTP and also accepts the legacy
//! JSON wire session response still returned by older drivers (PhantomJS,
//! GhostDriver).

use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::{Client, Method};
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::config::BrowserConfig;

use super::{RenderError, Renderer};

/// Failure of a single WebDriver call, before it is tied to a render step.
enum CallError {
    Timeout,
    Failed(String),
}

impl CallError {
    fn into_render_error(self, wrap: impl FnOnce(String) -> RenderError) -> RenderError {
        match self {
            CallError::Timeout => RenderError::Timeout,
            CallError::Failed(reason) => wrap(reason),
        }
    }
}

/// Renderer backed by a remote WebDriver endpoint.
///
/// Each render opens a fresh browser session and deletes it afterwards, so a
/// stalled page only holds up the worker that requested it.
pub struct WebDriverRenderer {
    client: Client,
    config: BrowserConfig,
}

impl WebDriverRenderer {
    /// Create a new WebDriver renderer.
    pub fn new(config: BrowserConfig) -> Result<Self, RenderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()
            .map_err(|e| RenderError::SessionFailed(format!("failed to build client: {}", e)))?;

        Ok(Self { client, config })
    }

    /// Get the WebDriver base URL without trailing slash.
    fn base_url(&self) -> &str {
        self.config.url.trim_end_matches('/')
    }

    /// URL of the render page the browser visits for `id`.
    pub fn page_url(&self, id: i64) -> String {
        format!(
            "{}/{}",
            self.config.render_base_url.trim_end_matches('/'),
            id
        )
    }

    /// Issue one WebDriver command and return the decoded JSON body.
    async fn call(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Value, CallError> {
        let url = format!("{}{}", self.base_url(), path);
        let mut request = self.client.request(method, &url);
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                CallError::Timeout
            } else {
                CallError::Failed(e.to_string())
            }
        })?;

        let status = response.status();
        let body: Value = response
            .json()
            .await
            .map_err(|e| CallError::Failed(format!("invalid response from {}: {}", path, e)))?;

        // Legacy drivers report failures with HTTP 200 and a non-zero status.
        let legacy_failure = body
            .get("status")
            .and_then(Value::as_i64)
            .is_some_and(|s| s != 0);

        if !status.is_success() || legacy_failure {
            return Err(CallError::Failed(format!(
                "HTTP {}: {}",
                status,
                error_message(&body)
            )));
        }

        Ok(body)
    }

    async fn open_session(&self) -> Result<String, RenderError> {
        let capabilities = json!({ "browserName": self.config.browser_name });
        let body = json!({
            "capabilities": { "alwaysMatch": capabilities },
            "desiredCapabilities": capabilities,
        });

        let response = self
            .call(Method::POST, "/session", Some(body))
            .await
            .map_err(|e| e.into_render_error(RenderError::SessionFailed))?;

        parse_session_id(&response).ok_or_else(|| {
            RenderError::SessionFailed("response did not contain a session id".to_string())
        })
    }

    async fn close_session(&self, session_id: &str) {
        let path = format!("/session/{}", session_id);
        if let Err(CallError::Failed(reason)) = self.call(Method::DELETE, &path, None).await {
            debug!(session_id, %reason, "Failed to delete browser session");
        }
    }

    async fn capture(&self, session_id: &str, id: i64) -> Result<Vec<u8>, RenderError> {
        let rect = json!({
            "width": self.config.window_width,
            "height": self.config.window_height,
        });
        if let Err(CallError::Failed(reason)) = self
            .call(
                Method::POST,
                &format!("/session/{}/window/rect", session_id),
                Some(rect),
            )
            .await
        {
            warn!(session_id, %reason, "Failed to resize browser window, using driver default");
        }

        let url = self.page_url(id);
        self.call(
            Method::POST,
            &format!("/session/{}/url", session_id),
            Some(json!({ "url": url })),
        )
        .await
        .map_err(|e| {
            e.into_render_error(|reason| RenderError::Navigation {
                url: url.clone(),
                reason,
            })
        })?;

        let response = self
            .call(
                Method::GET,
                &format!("/session/{}/screenshot", session_id),
                None,
            )
            .await
            .map_err(|e| e.into_render_error(RenderError::Screenshot))?;

        let encoded = response
            .get("value")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                RenderError::Screenshot("response did not contain image data".to_string())
            })?;

        decode_screenshot(encoded)
    }
}

#[async_trait]
impl Renderer for WebDriverRenderer {
    fn name(&self) -> &str {
        "webdriver"
    }

    async fn render(&self, id: i64) -> Result<Vec<u8>, RenderError> {
        let session_id = self.open_session().await?;
        debug!(request_id = id, session_id = %session_id, "Opened browser session");

        let result = self.capture(&session_id, id).await;
        self.close_session(&session_id).await;
        result
    }
}

/// Extract the session id from a W3C or legacy new-session response.
fn parse_session_id(body: &Value) -> Option<String> {
    body.get("value")
        .and_then(|v| v.get("sessionId"))
        .or_else(|| body.get("sessionId"))
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

/// Best-effort error text from a WebDriver error body.
fn error_message(body: &Value) -> String {
    let value = body.get("value");
    value
        .and_then(|v| v.get("message"))
        .or_else(|| value.and_then(|v| v.get("error")))
        .and_then(Value::as_str)
        .unwrap_or("unknown error")
        .to_string()
}

/// Decode a base64 screenshot payload, tolerating embedded line breaks.
fn decode_screenshot(encoded: &str) -> Result<Vec<u8>, RenderError> {
    let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
    STANDARD
        .decode(compact)
        .map_err(|e| RenderError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> BrowserConfig {
        BrowserConfig {
            url: "http://127.0.0.1:1/".to_string(),
            render_base_url: "http://textshot:8085/".to_string(),
            timeout_secs: 2,
            ..Default::default()
        }
    }

    #[test]
    fn test_page_url() {
        let renderer = WebDriverRenderer::new(config()).unwrap();
        assert_eq!(renderer.page_url(42), "http://textshot:8085/42");
        assert_eq!(renderer.base_url(), "http://127.0.0.1:1");
    }

    #[test]
    fn test_parse_session_id_w3c() {
        let body = json!({ "value": { "sessionId": "abc", "capabilities": {} } });
        assert_eq!(parse_session_id(&body).as_deref(), Some("abc"));
    }

    #[test]
    fn test_parse_session_id_legacy() {
        let body = json!({ "sessionId": "legacy-1", "status": 0, "value": {} });
        assert_eq!(parse_session_id(&body).as_deref(), Some("legacy-1"));
    }

    #[test]
    fn test_parse_session_id_missing() {
        assert!(parse_session_id(&json!({ "value": {} })).is_none());
        assert!(parse_session_id(&json!({ "sessionId": "" })).is_none());
    }

    #[test]
    fn test_error_message() {
        let body = json!({ "value": { "error": "no such window", "message": "window closed" } });
        assert_eq!(error_message(&body), "window closed");

        let body = json!({ "value": { "error": "invalid session id" } });
        assert_eq!(error_message(&body), "invalid session id");

        assert_eq!(error_message(&json!({})), "unknown error");
    }

    #[test]
    fn test_decode_screenshot() {
        assert_eq!(decode_screenshot("iVBORw==").unwrap(), vec![0x89, 0x50, 0x4e, 0x47]);
        assert_eq!(
            decode_screenshot("iVBO\nRw==").unwrap(),
            vec![0x89, 0x50, 0x4e, 0x47]
        );
        assert!(matches!(
            decode_screenshot("not base64!"),
            Err(RenderError::Decode(_))
        ));
    }

    #[tokio::test]
    async fn test_render_unreachable_service_fails() {
        let renderer = WebDriverRenderer::new(config()).unwrap();
        let result = renderer.render(1).await;
        assert!(matches!(
            result,
            Err(RenderError::SessionFailed(_)) | Err(RenderError::Timeout)
        ));
    }
}
