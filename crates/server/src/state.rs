use std::sync::Arc;

use textshot_core::{ArtifactCache, PageTemplate};

/// Shared application state
pub struct AppState {
    cache: Arc<dyn ArtifactCache>,
    template: Arc<PageTemplate>,
}

impl AppState {
    pub fn new(cache: Arc<dyn ArtifactCache>, template: Arc<PageTemplate>) -> Self {
        Self { cache, template }
    }

    pub fn cache(&self) -> &dyn ArtifactCache {
        self.cache.as_ref()
    }

    pub fn template(&self) -> &PageTemplate {
        self.template.as_ref()
    }
}
