//! PostgreSQL configuration.

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Database configuration (`DATABASE_` prefix).
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub name: String,

    /// Connection pool size.
    #[serde(default = "default_pool_size")]
    pub pool_size: u32,

    /// Seconds to wait for a connection from the pool.
    #[serde(default = "default_pool_timeout")]
    pub pool_timeout_secs: u64,

    /// Default transaction isolation for the API pool. The publisher keeps
    /// the engine default (READ COMMITTED) for its claim transactions.
    #[serde(default = "default_isolation_level")]
    pub isolation_level: String,
}

impl DatabaseSettings {
    /// Assembles the postgres connection URL.
    pub fn url(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.user, self.password, self.host, self.port, self.name
        )
    }

    pub fn pool_timeout(&self) -> Duration {
        Duration::from_secs(self.pool_timeout_secs)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.host.is_empty() {
            return Err(ValidationError::MissingRequired("DATABASE_HOST"));
        }
        if self.name.is_empty() {
            return Err(ValidationError::MissingRequired("DATABASE_NAME"));
        }
        if self.pool_size == 0 {
            return Err(ValidationError::OutOfRange("DATABASE_POOL_SIZE must be >= 1"));
        }
        Ok(())
    }
}

fn default_pool_size() -> u32 {
    10
}

fn default_pool_timeout() -> u64 {
    30
}

fn default_isolation_level() -> String {
    "REPEATABLE READ".to_string()
}
