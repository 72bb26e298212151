//! Redis configuration.

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Redis configuration (`REDIS_` prefix).
#[derive(Debug, Clone, Deserialize)]
pub struct RedisSettings {
    /// Redis connection URL.
    pub url: String,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Socket timeout in seconds.
    #[serde(default = "default_socket_timeout")]
    pub socket_timeout_secs: u64,
}

impl RedisSettings {
    pub fn socket_timeout(&self) -> Duration {
        Duration::from_secs(self.socket_timeout_secs)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.url.is_empty() {
            return Err(ValidationError::MissingRequired("REDIS_URL"));
        }
        if !self.url.starts_with("redis://") && !self.url.starts_with("rediss://") {
            return Err(ValidationError::InvalidRedisUrl);
        }
        Ok(())
    }
}

impl Default for RedisSettings {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: default_max_connections(),
            socket_timeout_secs: default_socket_timeout(),
        }
    }
}

fn default_max_connections() -> u32 {
    20
}

fn default_socket_timeout() -> u64 {
    5
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let settings = RedisSettings::default();
        assert_eq!(settings.max_connections, 20);
        assert_eq!(settings.socket_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn validation_rejects_missing_url() {
        assert!(RedisSettings::default().validate().is_err());
    }

    #[test]
    fn validation_rejects_non_redis_scheme() {
        let settings = RedisSettings {
            url: "http://localhost:6379".to_string(),
            ..Default::default()
        };
        assert_eq!(settings.validate(), Err(ValidationError::InvalidRedisUrl));
    }

    #[test]
    fn validation_accepts_rediss() {
        let settings = RedisSettings {
            url: "rediss://cache.example.com:6380".to_string(),
            ..Default::default()
        };
        assert!(settings.validate().is_ok());
    }
}
