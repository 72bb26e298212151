//! Cached USD to RUB rate lookup.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value as JsonValue;
use tracing::{debug, error, warn};

use crate::ports::CacheStore;

const CBR_URL: &str = "https://www.cbr-xml-daily.ru/daily_json.js";
const USD_CACHE_KEY: &str = "usd_to_rub";
const CACHE_TTL_SECS: u64 = 3600;
const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Extracts `Valute.USD.Value` from the CBR daily JSON document.
pub fn parse_usd_rate(body: &JsonValue) -> Option<f64> {
    body.get("Valute")?.get("USD")?.get("Value")?.as_f64()
}

/// Currency rate lookup with a cache in front of the CBR daily feed.
///
/// The network fetch is the authority: cache failures (read or write) are
/// logged and ignored, and every fetch or parse failure collapses to `None`
/// so callers decide whether a missing rate is tolerable.
#[derive(Clone)]
pub struct CurrencyService {
    cache: Arc<dyn CacheStore>,
    http: reqwest::Client,
    url: String,
}

impl CurrencyService {
    pub fn new(cache: Arc<dyn CacheStore>) -> Self {
        Self {
            cache,
            http: reqwest::Client::builder()
                .timeout(HTTP_TIMEOUT)
                .build()
                .unwrap_or_default(),
            url: CBR_URL.to_string(),
        }
    }

    pub async fn get_usd_rate(&self) -> Option<f64> {
        match self.cache.get(USD_CACHE_KEY).await {
            Ok(Some(cached)) => {
                if let Ok(rate) = cached.parse::<f64>() {
                    debug!(rate, "USD rate served from cache");
                    return Some(rate);
                }
                warn!(value = %cached, "unparseable USD rate in cache, refetching");
            }
            Ok(None) => {}
            Err(e) => warn!(error = %e, "cache read failed, falling back to fetch"),
        }

        let rate = self.fetch_rate().await?;

        if let Err(e) = self
            .cache
            .set_ex(USD_CACHE_KEY, &rate.to_string(), CACHE_TTL_SECS)
            .await
        {
            warn!(error = %e, "failed to cache USD rate");
        }

        Some(rate)
    }

    async fn fetch_rate(&self) -> Option<f64> {
        let response = match self.http.get(&self.url).send().await {
            Ok(r) => r,
            Err(e) => {
                error!(error = %e, "failed to fetch USD rate");
                return None;
            }
        };

        if !response.status().is_success() {
            error!(status = %response.status(), "CBR returned non-success status");
            return None;
        }

        let body: JsonValue = match response.json().await {
            Ok(b) => b,
            Err(e) => {
                error!(error = %e, "failed to parse CBR response");
                return None;
            }
        };

        match parse_usd_rate(&body) {
            Some(rate) => {
                debug!(rate, "fetched USD rate from CBR");
                Some(rate)
            }
            None => {
                error!("USD rate missing from CBR response");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryCacheStore;
    use serde_json::json;

    #[test]
    fn parse_extracts_usd_value() {
        let body = json!({
            "Date": "2026-08-01T11:30:00+03:00",
            "Valute": {
                "USD": {"CharCode": "USD", "Nominal": 1, "Value": 80.5},
                "EUR": {"CharCode": "EUR", "Nominal": 1, "Value": 90.1}
            }
        });
        assert_eq!(parse_usd_rate(&body), Some(80.5));
    }

    #[test]
    fn parse_rejects_structural_mismatch() {
        assert_eq!(parse_usd_rate(&json!({})), None);
        assert_eq!(parse_usd_rate(&json!({"Valute": {}})), None);
        assert_eq!(
            parse_usd_rate(&json!({"Valute": {"USD": {"Value": "eighty"}}})),
            None
        );
    }

    #[tokio::test]
    async fn cached_rate_short_circuits_the_fetch() {
        let cache = Arc::new(InMemoryCacheStore::new());
        cache.set_ex(USD_CACHE_KEY, "80.5", CACHE_TTL_SECS).await.unwrap();

        let service = CurrencyService::new(cache);
        assert_eq!(service.get_usd_rate().await, Some(80.5));
    }

    #[tokio::test]
    async fn integer_shaped_cache_entry_parses_as_rate() {
        let cache = Arc::new(InMemoryCacheStore::new());
        cache.set_ex(USD_CACHE_KEY, "80", CACHE_TTL_SECS).await.unwrap();

        let service = CurrencyService::new(cache);
        assert_eq!(service.get_usd_rate().await, Some(80.0));
    }
}
