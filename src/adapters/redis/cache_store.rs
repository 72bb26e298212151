//! Redis-backed cache store.

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;

use crate::config::RedisSettings;
use crate::domain::ParcelError;
use crate::ports::CacheStore;

/// CacheStore over a multiplexed Redis connection.
///
/// The connection handle is cheap to clone; every operation is a single
/// round-trip bounded by the client's response timeout.
#[derive(Clone)]
pub struct RedisCacheStore {
    conn: MultiplexedConnection,
}

impl RedisCacheStore {
    pub fn new(conn: MultiplexedConnection) -> Self {
        Self { conn }
    }

    /// Opens the client and a multiplexed connection from settings.
    pub async fn connect(settings: &RedisSettings) -> Result<Self, ParcelError> {
        let client = redis::Client::open(settings.url.as_str())
            .map_err(|e| ParcelError::Cache(format!("invalid redis url: {}", e)))?;
        let conn = client
            .get_multiplexed_tokio_connection()
            .await
            .map_err(|e| ParcelError::Cache(format!("failed to connect: {}", e)))?;
        Ok(Self::new(conn))
    }

    /// Round-trip health probe.
    pub async fn ping(&self) -> Result<(), ParcelError> {
        let mut conn = self.conn.clone();
        redis::cmd("PING")
            .query_async::<_, String>(&mut conn)
            .await
            .map_err(ParcelError::from)?;
        Ok(())
    }
}

#[async_trait]
impl CacheStore for RedisCacheStore {
    async fn get(&self, key: &str) -> Result<Option<String>, ParcelError> {
        let mut conn = self.conn.clone();
        let value: Option<String> = conn.get(key).await.map_err(ParcelError::from)?;
        Ok(value)
    }

    async fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> Result<(), ParcelError> {
        let mut conn = self.conn.clone();
        conn.set_ex::<_, _, ()>(key, value, ttl_secs)
            .await
            .map_err(ParcelError::from)?;
        Ok(())
    }
}
