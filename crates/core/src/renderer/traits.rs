//! Trait definitions for the renderer module.

use async_trait::async_trait;

use super::error::RenderError;

/// Captures the render page for a request as image bytes.
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Returns the name of this renderer implementation.
    fn name(&self) -> &str;

    /// Loads the render page for `id` and returns its screenshot.
    async fn render(&self, id: i64) -> Result<Vec<u8>, RenderError>;
}
