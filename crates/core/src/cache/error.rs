//! Error types for the cache module.

use thiserror::Error;

/// Errors returned by artifact cache backends.
#[derive(Debug, Error)]
pub enum CacheError {
    /// Key is absent or its record expired.
    #[error("Cache record not found: {key}")]
    NotFound { key: String },

    /// Could not reach the backing store.
    #[error("Cache connection failed: {0}")]
    Connection(String),

    /// The store rejected or failed the operation.
    #[error("Cache backend error: {0}")]
    Backend(String),
}

impl CacheError {
    /// Creates a not-found error for the given key.
    pub fn not_found(key: impl Into<String>) -> Self {
        Self::NotFound { key: key.into() }
    }

    /// Whether the error means the record is simply absent.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl From<redis::RedisError> for CacheError {
    fn from(e: redis::RedisError) -> Self {
        if e.is_connection_refusal() || e.is_connection_dropped() || e.is_io_error() {
            Self::Connection(e.to_string())
        } else {
            Self::Backend(e.to_string())
        }
    }
}
