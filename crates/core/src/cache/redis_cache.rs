//! Redis cache backend.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{Client, IntoConnectionInfo};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::config::CacheConfig;

use super::error::CacheError;
use super::key::CacheKey;
use super::traits::ArtifactCache;

/// Cache stored in Redis with `SET .. EX` expiry.
///
/// The connection manager is dropped on `close`; later calls fail with
/// `CacheError::Connection`.
pub struct RedisCache {
    conn: RwLock<Option<ConnectionManager>>,
    ttl_secs: u64,
}

impl RedisCache {
    /// Connect to Redis and verify the server answers PING.
    pub async fn connect(config: &CacheConfig) -> Result<Self, CacheError> {
        let mut info = config
            .url
            .as_str()
            .into_connection_info()
            .map_err(|e| CacheError::Connection(format!("invalid redis url: {}", e)))?;
        if let Some(password) = config.password.as_ref().filter(|p| !p.is_empty()) {
            info.redis.password = Some(password.clone());
        }

        let client = Client::open(info).map_err(|e| CacheError::Connection(e.to_string()))?;
        let mut conn = ConnectionManager::new(client)
            .await
            .map_err(|e| CacheError::Connection(e.to_string()))?;

        let pong: String = redis::cmd("PING").query_async(&mut conn).await?;
        info!(url = %config.url, reply = %pong, "Connected to redis");

        Ok(Self {
            conn: RwLock::new(Some(conn)),
            ttl_secs: config.default_ttl_secs,
        })
    }

    async fn connection(&self) -> Result<ConnectionManager, CacheError> {
        self.conn
            .read()
            .await
            .clone()
            .ok_or_else(|| CacheError::Connection("redis cache is closed".to_string()))
    }

    async fn set(&self, key: &str, value: &[u8]) -> Result<(), CacheError> {
        let mut conn = self.connection().await?;
        redis::cmd("SET")
            .arg(key)
            .arg(value)
            .arg("EX")
            .arg(self.ttl_secs)
            .query_async::<()>(&mut conn)
            .await?;
        debug!(key, bytes = value.len(), "Stored cache record");
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>, CacheError> {
        let mut conn = self.connection().await?;
        let value: Option<Vec<u8>> = redis::cmd("GET").arg(key).query_async(&mut conn).await?;
        value.ok_or_else(|| CacheError::not_found(key))
    }
}

#[async_trait]
impl ArtifactCache for RedisCache {
    fn name(&self) -> &str {
        "redis"
    }

    async fn store_binary(&self, id: &str, bytes: &[u8]) -> Result<(), CacheError> {
        self.set(&CacheKey::binary(id), bytes).await
    }

    async fn get_binary(&self, id: &str) -> Result<Vec<u8>, CacheError> {
        self.get(&CacheKey::binary(id)).await
    }

    async fn store_text(&self, id: &str, text: &str) -> Result<(), CacheError> {
        self.set(&CacheKey::text(id), text.as_bytes()).await
    }

    async fn get_text(&self, id: &str) -> Result<String, CacheError> {
        let key = CacheKey::text(id);
        let bytes = self.get(&key).await?;
        String::from_utf8(bytes)
            .map_err(|e| CacheError::Backend(format!("record {} is not utf-8: {}", key, e)))
    }

    async fn close(&self) {
        // Clones held by in-flight calls keep the socket open until they finish.
        if self.conn.write().await.take().is_some() {
            info!("Released redis connection");
        }
    }
}
