//! EventPublisher port - outbound broker publishing.

use async_trait::async_trait;

use crate::domain::{BrokerMessage, ParcelError};

/// Publishes a message to the broker exchange under a routing key.
///
/// Implementations must not return `Ok` unless the broker accepted the
/// message (publisher confirms for the rabbitmq adapter); the outbox loop
/// marks rows applied based on that guarantee. Connection-level failures are
/// reported as `ParcelError::BrokerConnection` so the loop can break the
/// batch and retry later; a per-message rejection (broker nack, encode
/// failure) is `ParcelError::Broker` and fails only that row.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, routing_key: &str, message: &BrokerMessage) -> Result<(), ParcelError>;
}
