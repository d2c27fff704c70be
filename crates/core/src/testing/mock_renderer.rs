//! Mock renderer for testing.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::cache::ArtifactCache;
use crate::renderer::{RenderError, Renderer};

use super::fixtures::PNG_BYTES;

/// A recorded render call for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedRender {
    /// Request identifier that was rendered.
    pub id: i64,
    /// Text the render page would have shown, when a probe cache is attached.
    pub cached_text: Option<String>,
    /// Whether the render succeeded.
    pub success: bool,
}

/// Mock implementation of the Renderer trait.
///
/// Provides controllable behavior for testing:
/// - Return fixed image bytes
/// - Fail for chosen ids or for every call
/// - Simulate slow renders
/// - Look up the cached text the way the browser would via the render page
#[derive(Clone)]
pub struct MockRenderer {
    renders: Arc<RwLock<Vec<RecordedRender>>>,
    image: Arc<RwLock<Vec<u8>>>,
    failing_ids: Arc<RwLock<HashSet<i64>>>,
    fail_all: Arc<RwLock<bool>>,
    delays: Arc<RwLock<Vec<(i64, Duration)>>>,
    probe: Option<Arc<dyn ArtifactCache>>,
}

impl Default for MockRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl MockRenderer {
    /// Create a new mock renderer that succeeds with [`PNG_BYTES`].
    pub fn new() -> Self {
        Self {
            renders: Arc::new(RwLock::new(Vec::new())),
            image: Arc::new(RwLock::new(PNG_BYTES.to_vec())),
            failing_ids: Arc::new(RwLock::new(HashSet::new())),
            fail_all: Arc::new(RwLock::new(false)),
            delays: Arc::new(RwLock::new(Vec::new())),
            probe: None,
        }
    }

    /// Read the text record from `cache` on every render, as the real page does.
    pub fn with_text_probe(mut self, cache: Arc<dyn ArtifactCache>) -> Self {
        self.probe = Some(cache);
        self
    }

    /// Get all recorded renders.
    pub async fn recorded_renders(&self) -> Vec<RecordedRender> {
        self.renders.read().await.clone()
    }

    /// Get the number of renders performed.
    pub async fn render_count(&self) -> usize {
        self.renders.read().await.len()
    }

    /// Set the bytes returned by successful renders.
    pub async fn set_image(&self, image: Vec<u8>) {
        *self.image.write().await = image;
    }

    /// Make renders of `id` fail.
    pub async fn fail_for(&self, id: i64) {
        self.failing_ids.write().await.insert(id);
    }

    /// Make every render fail.
    pub async fn set_fail_all(&self, fail: bool) {
        *self.fail_all.write().await = fail;
    }

    /// Delay renders of `id`.
    pub async fn set_delay(&self, id: i64, delay: Duration) {
        self.delays.write().await.push((id, delay));
    }

    async fn delay_for(&self, id: i64) -> Option<Duration> {
        self.delays
            .read()
            .await
            .iter()
            .find(|(delayed, _)| *delayed == id)
            .map(|(_, delay)| *delay)
    }
}

#[async_trait]
impl Renderer for MockRenderer {
    fn name(&self) -> &str {
        "mock"
    }

    async fn render(&self, id: i64) -> Result<Vec<u8>, RenderError> {
        if let Some(delay) = self.delay_for(id).await {
            tokio::time::sleep(delay).await;
        }

        let cached_text = match &self.probe {
            Some(cache) => cache.get_text(&id.to_string()).await.ok(),
            None => None,
        };

        let fail = *self.fail_all.read().await || self.failing_ids.read().await.contains(&id);
        self.renders.write().await.push(RecordedRender {
            id,
            cached_text,
            success: !fail,
        });

        if fail {
            return Err(RenderError::Screenshot("mock render failure".to_string()));
        }
        Ok(self.image.read().await.clone())
    }
}
