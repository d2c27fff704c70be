//! Types for the pipeline module.

/// Text sent back to the user when rendering fails.
pub const RENDER_ERROR_TEXT: &str = "Error occured";

/// A message accepted for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingRequest {
    /// Correlation key across the cache and the render endpoint.
    pub id: i64,
    pub chat_id: i64,
    pub text: String,
}

impl IncomingRequest {
    /// Cache identifier for this request.
    pub fn cache_id(&self) -> String {
        self.id.to_string()
    }
}

/// Outcome of rendering a request, waiting to be delivered.
///
/// Artifact bytes never travel inline; on success they sit in the cache under
/// the request id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedResult {
    pub id: i64,
    pub chat_id: i64,
    pub text: String,
    /// Empty on success.
    pub error_text: String,
}

impl PreparedResult {
    /// Result for a request whose artifact is cached.
    pub fn success(request: IncomingRequest) -> Self {
        Self {
            id: request.id,
            chat_id: request.chat_id,
            text: request.text,
            error_text: String::new(),
        }
    }

    /// Result carrying a user-visible error message.
    pub fn failure(request: IncomingRequest, error_text: impl Into<String>) -> Self {
        Self {
            id: request.id,
            chat_id: request.chat_id,
            text: request.text,
            error_text: error_text.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error_text.is_empty()
    }

    pub fn cache_id(&self) -> String {
        self.id.to_string()
    }
}
