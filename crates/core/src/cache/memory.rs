//! In-process cache backend.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::debug;

use super::error::CacheError;
use super::key::CacheKey;
use super::traits::ArtifactCache;

#[derive(Debug, Clone)]
enum Value {
    Text(String),
    Bytes(Vec<u8>),
}

#[derive(Debug, Clone)]
struct Entry {
    value: Value,
    expires_at: Instant,
}

/// Cache backed by a map in process memory.
///
/// Records use the same namespaced keys as the Redis backend. Expired entries
/// are evicted lazily on read and in bulk by [`MemoryCache::purge_expired`],
/// which [`MemoryCache::spawn_purge_task`] runs on a timer.
pub struct MemoryCache {
    entries: RwLock<HashMap<String, Entry>>,
    ttl: Duration,
}

impl MemoryCache {
    /// Create a new cache that expires every record after `ttl`.
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// Number of records currently held, expired or not.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Whether a live record exists under the full store key.
    pub async fn contains_key(&self, key: &str) -> bool {
        let entries = self.entries.read().await;
        entries
            .get(key)
            .is_some_and(|e| e.expires_at > Instant::now())
    }

    /// Drops every expired record. Returns how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, e| e.expires_at > now);
        before - entries.len()
    }

    /// Spawns a task that calls [`purge_expired`](Self::purge_expired) every
    /// `period`. The task exits once the last handle to the cache is dropped.
    pub fn spawn_purge_task(cache: &Arc<Self>, period: Duration) -> JoinHandle<()> {
        let cache = Arc::downgrade(cache);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            // The first tick completes immediately.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let Some(cache) = cache.upgrade() else {
                    break;
                };
                let purged = cache.purge_expired().await;
                if purged > 0 {
                    debug!(purged, "Purged expired cache records");
                }
            }
        })
    }

    async fn put(&self, key: String, value: Value) {
        let entry = Entry {
            value,
            expires_at: Instant::now() + self.ttl,
        };
        self.entries.write().await.insert(key, entry);
    }

    async fn fetch(&self, key: &str) -> Result<Value, CacheError> {
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                Some(entry) if entry.expires_at > Instant::now() => {
                    return Ok(entry.value.clone());
                }
                Some(_) => {}
                None => return Err(CacheError::not_found(key)),
            }
        }

        // Expired: evict unless a writer refreshed it in between.
        let mut entries = self.entries.write().await;
        if entries
            .get(key)
            .is_some_and(|e| e.expires_at <= Instant::now())
        {
            entries.remove(key);
        }
        Err(CacheError::not_found(key))
    }
}

#[async_trait]
impl ArtifactCache for MemoryCache {
    fn name(&self) -> &str {
        "memory"
    }

    async fn store_binary(&self, id: &str, bytes: &[u8]) -> Result<(), CacheError> {
        self.put(CacheKey::binary(id), Value::Bytes(bytes.to_vec()))
            .await;
        Ok(())
    }

    async fn get_binary(&self, id: &str) -> Result<Vec<u8>, CacheError> {
        let key = CacheKey::binary(id);
        match self.fetch(&key).await? {
            Value::Bytes(bytes) => Ok(bytes),
            Value::Text(_) => Err(CacheError::Backend(format!(
                "record {} holds text, expected bytes",
                key
            ))),
        }
    }

    async fn store_text(&self, id: &str, text: &str) -> Result<(), CacheError> {
        self.put(CacheKey::text(id), Value::Text(text.to_string()))
            .await;
        Ok(())
    }

    async fn get_text(&self, id: &str) -> Result<String, CacheError> {
        let key = CacheKey::text(id);
        match self.fetch(&key).await? {
            Value::Text(text) => Ok(text),
            Value::Bytes(_) => Err(CacheError::Backend(format!(
                "record {} holds bytes, expected text",
                key
            ))),
        }
    }
}
