//! CacheStore port - string cache with expiry.

use async_trait::async_trait;

use crate::domain::ParcelError;

/// Key-value cache used for read-through caching and the currency rate.
///
/// Callers treat cache failures as soft: a read miss and a read error look
/// the same at the call site, and write errors are logged, never propagated
/// into request handling.
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, ParcelError>;

    async fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> Result<(), ParcelError>;
}

/// Builds a read-through cache key: `cache:<segment>:<...parts>`.
pub fn cache_key(parts: &[&str]) -> String {
    let mut key = String::from("cache");
    for part in parts {
        key.push(':');
        key.push_str(part);
    }
    key
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_key_joins_parts_with_colons() {
        assert_eq!(
            cache_key(&["parcels", "sess-1", "parcel-2"]),
            "cache:parcels:sess-1:parcel-2"
        );
    }
}
