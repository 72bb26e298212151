//! Outbox publisher configuration.

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Publisher loop configuration (`PUBLISHER_` prefix).
#[derive(Debug, Clone, Deserialize)]
pub struct PublisherSettings {
    /// Max outbox rows claimed per iteration.
    #[serde(default = "default_batch_size")]
    pub batch_size: u32,

    /// Seconds to sleep when the work queue is empty or after a broker
    /// failure.
    #[serde(default = "default_sleep_interval")]
    pub sleep_interval: u64,
}

impl PublisherSettings {
    pub fn sleep(&self) -> Duration {
        Duration::from_secs(self.sleep_interval)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.batch_size == 0 {
            return Err(ValidationError::OutOfRange("PUBLISHER_BATCH_SIZE must be >= 1"));
        }
        Ok(())
    }
}

impl Default for PublisherSettings {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            sleep_interval: default_sleep_interval(),
        }
    }
}

fn default_batch_size() -> u32 {
    50
}

fn default_sleep_interval() -> u64 {
    5
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let settings = PublisherSettings::default();
        assert_eq!(settings.batch_size, 50);
        assert_eq!(settings.sleep(), Duration::from_secs(5));
    }

    #[test]
    fn zero_batch_is_rejected() {
        let settings = PublisherSettings {
            batch_size: 0,
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }
}
