//! Configuration error types.

use thiserror::Error;

/// Errors raised while loading configuration from the environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration error: {0}")]
    Load(#[from] config::ConfigError),
}

/// Errors raised by semantic validation of loaded configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Missing required setting: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid Redis URL (must start with redis:// or rediss://)")]
    InvalidRedisUrl,

    #[error("Invalid RabbitMQ URL (must start with amqp:// or amqps://)")]
    InvalidAmqpUrl,

    #[error("Invalid MongoDB URI (must start with mongodb:// or mongodb+srv://)")]
    InvalidMongoUri,

    #[error("Setting out of range: {0}")]
    OutOfRange(&'static str),
}
