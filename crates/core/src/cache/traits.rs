//! Trait definitions for the cache module.

use async_trait::async_trait;

use super::error::CacheError;

/// Time-bounded key/value store with independent text and binary namespaces.
///
/// Every store call applies the backend's configured TTL. Reads of missing or
/// expired records return [`CacheError::NotFound`]; callers treat that and any
/// other read failure as absence.
#[async_trait]
pub trait ArtifactCache: Send + Sync {
    /// Returns the name of this backend.
    fn name(&self) -> &str;

    /// Stores rendered artifact bytes for a request identifier.
    async fn store_binary(&self, id: &str, bytes: &[u8]) -> Result<(), CacheError>;

    /// Fetches artifact bytes for a request identifier.
    async fn get_binary(&self, id: &str) -> Result<Vec<u8>, CacheError>;

    /// Stores message text for a request identifier.
    async fn store_text(&self, id: &str, text: &str) -> Result<(), CacheError>;

    /// Fetches message text for a request identifier.
    async fn get_text(&self, id: &str) -> Result<String, CacheError>;

    /// Releases the underlying connection.
    async fn close(&self) {}
}
