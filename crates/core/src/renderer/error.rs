//! Error types for the renderer module.

use thiserror::Error;

/// Errors that can occur while capturing a rendered page.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The automation service refused or failed to open a browser session.
    #[error("Failed to open browser session: {0}")]
    SessionFailed(String),

    /// The browser could not load the render page.
    #[error("Failed to load page {url}: {reason}")]
    Navigation { url: String, reason: String },

    /// The screenshot command failed.
    #[error("Failed to capture screenshot: {0}")]
    Screenshot(String),

    /// The screenshot payload was not valid base64.
    #[error("Failed to decode screenshot: {0}")]
    Decode(String),

    /// The automation service did not answer in time.
    #[error("Automation service timed out")]
    Timeout,
}
