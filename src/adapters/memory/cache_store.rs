//! In-memory cache store.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::ParcelError;
use crate::ports::CacheStore;

/// Cache store backed by a map. Expiry is recorded but not enforced; tests
/// assert on the stored TTL instead of sleeping.
#[derive(Default)]
pub struct InMemoryCacheStore {
    entries: RwLock<HashMap<String, (String, u64)>>,
    fail: AtomicBool,
}

impl InMemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent operation fail, simulating an unreachable
    /// cache.
    pub fn set_failing(&self, failing: bool) {
        self.fail.store(failing, Ordering::SeqCst);
    }

    pub async fn ttl_of(&self, key: &str) -> Option<u64> {
        self.entries.read().await.get(key).map(|(_, ttl)| *ttl)
    }
}

#[async_trait]
impl CacheStore for InMemoryCacheStore {
    async fn get(&self, key: &str) -> Result<Option<String>, ParcelError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(ParcelError::Cache("cache unavailable".to_string()));
        }
        Ok(self
            .entries
            .read()
            .await
            .get(key)
            .map(|(value, _)| value.clone()))
    }

    async fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> Result<(), ParcelError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(ParcelError::Cache("cache unavailable".to_string()));
        }
        self.entries
            .write()
            .await
            .insert(key.to_string(), (value.to_string(), ttl_secs));
        Ok(())
    }
}
