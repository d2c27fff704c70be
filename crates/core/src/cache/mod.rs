//! Artifact cache.
//!
//! The cache is the only shared mutable resource in the pipeline: ingestion
//! writes message text before queuing a task, the render endpoint reads it
//! back, workers write screenshot bytes and the sender reads them.

mod error;
mod key;
mod memory;
mod redis_cache;
mod traits;

pub use error::CacheError;
pub use key::{CacheKey, Namespace};
pub use memory::MemoryCache;
pub use redis_cache::RedisCache;
pub use traits::ArtifactCache;

use std::sync::Arc;
use std::time::Duration;

use crate::config::{CacheBackend, CacheConfig};

/// Factory function to create the configured cache backend.
///
/// For Redis this connects and pings the server, so a failure here means the
/// store is unreachable. The memory backend gets a background task sweeping
/// out expired records every `purge_interval_secs`.
pub async fn create_cache(config: &CacheConfig) -> Result<Arc<dyn ArtifactCache>, CacheError> {
    let ttl = Duration::from_secs(config.default_ttl_secs);
    match config.backend {
        CacheBackend::Redis => Ok(Arc::new(RedisCache::connect(config).await?)),
        CacheBackend::Memory => {
            let cache = Arc::new(MemoryCache::new(ttl));
            MemoryCache::spawn_purge_task(
                &cache,
                Duration::from_secs(config.purge_interval_secs),
            );
            Ok(cache)
        }
    }
}
