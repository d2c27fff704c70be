//! Mock cache for testing.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::cache::{ArtifactCache, CacheError, CacheKey, MemoryCache};

/// In-memory cache with switchable failures.
///
/// Reads and writes go to a [`MemoryCache`] unless the matching failure switch
/// is on, in which case the call fails and the store is left untouched. Text
/// reads fail with [`CacheError::Connection`], everything else with
/// [`CacheError::Backend`].
#[derive(Clone)]
pub struct MockCache {
    inner: Arc<MemoryCache>,
    fail_text_writes: Arc<AtomicBool>,
    fail_text_reads: Arc<AtomicBool>,
    fail_binary_writes: Arc<AtomicBool>,
    fail_binary_reads: Arc<AtomicBool>,
}

impl Default for MockCache {
    fn default() -> Self {
        Self::new()
    }
}

impl MockCache {
    /// Create a mock cache with a one hour TTL.
    pub fn new() -> Self {
        Self::with_ttl(Duration::from_secs(3600))
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(MemoryCache::new(ttl)),
            fail_text_writes: Arc::new(AtomicBool::new(false)),
            fail_text_reads: Arc::new(AtomicBool::new(false)),
            fail_binary_writes: Arc::new(AtomicBool::new(false)),
            fail_binary_reads: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn set_fail_text_writes(&self, fail: bool) {
        self.fail_text_writes.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_text_reads(&self, fail: bool) {
        self.fail_text_reads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_binary_writes(&self, fail: bool) {
        self.fail_binary_writes.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_binary_reads(&self, fail: bool) {
        self.fail_binary_reads.store(fail, Ordering::SeqCst);
    }

    /// Whether a live text record exists for `id`.
    pub async fn has_text(&self, id: &str) -> bool {
        self.inner.contains_key(&CacheKey::text(id)).await
    }

    /// Whether a live binary record exists for `id`.
    pub async fn has_binary(&self, id: &str) -> bool {
        self.inner.contains_key(&CacheKey::binary(id)).await
    }

    fn injected(op: &str) -> CacheError {
        CacheError::Backend(format!("injected {} failure", op))
    }
}

#[async_trait]
impl ArtifactCache for MockCache {
    fn name(&self) -> &str {
        "mock"
    }

    async fn store_binary(&self, id: &str, bytes: &[u8]) -> Result<(), CacheError> {
        if self.fail_binary_writes.load(Ordering::SeqCst) {
            return Err(Self::injected("binary write"));
        }
        self.inner.store_binary(id, bytes).await
    }

    async fn get_binary(&self, id: &str) -> Result<Vec<u8>, CacheError> {
        if self.fail_binary_reads.load(Ordering::SeqCst) {
            return Err(Self::injected("binary read"));
        }
        self.inner.get_binary(id).await
    }

    async fn store_text(&self, id: &str, text: &str) -> Result<(), CacheError> {
        if self.fail_text_writes.load(Ordering::SeqCst) {
            return Err(Self::injected("text write"));
        }
        self.inner.store_text(id, text).await
    }

    async fn get_text(&self, id: &str) -> Result<String, CacheError> {
        if self.fail_text_reads.load(Ordering::SeqCst) {
            return Err(CacheError::Connection("injected text read failure".to_string()));
        }
        self.inner.get_text(id).await
    }
}
