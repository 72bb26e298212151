//! Broker topology initialization.
//!
//! The init-topology binary is the only place the exchange, queue, and
//! bindings are declared. Publishers and workers attach to existing topology
//! and never create it.

use std::time::Duration;

use lapin::options::{ExchangeDeclareOptions, QueueBindOptions, QueueDeclareOptions};
use lapin::types::FieldTable;
use lapin::{Connection, ConnectionProperties, ExchangeKind};
use tracing::{info, warn};

use crate::config::RabbitMqSettings;
use crate::domain::{EventType, ParcelError};

/// Waits until the broker accepts connections, retrying with a fixed delay.
pub async fn wait_for_broker(url: &str, retries: u32, delay: Duration) -> Result<(), ParcelError> {
    for attempt in 1..=retries {
        match Connection::connect(url, ConnectionProperties::default()).await {
            Ok(connection) => {
                let _ = connection.close(0, "topology probe").await;
                info!("RabbitMQ is ready");
                return Ok(());
            }
            Err(e) => {
                warn!(attempt, retries, error = %e, "RabbitMQ not ready yet");
                tokio::time::sleep(delay).await;
            }
        }
    }
    Err(ParcelError::Broker(format!(
        "RabbitMQ not ready after {} attempts",
        retries
    )))
}

/// Declares the topic exchange, the durable queue, and one binding per
/// event type.
pub async fn declare_topology(settings: &RabbitMqSettings) -> Result<(), ParcelError> {
    let connection = Connection::connect(&settings.url, ConnectionProperties::default())
        .await
        .map_err(|e| ParcelError::Broker(format!("connect failed: {}", e)))?;

    let channel = connection
        .create_channel()
        .await
        .map_err(|e| ParcelError::Broker(format!("channel open failed: {}", e)))?;

    channel
        .exchange_declare(
            &settings.exchange,
            ExchangeKind::Topic,
            ExchangeDeclareOptions {
                durable: true,
                ..ExchangeDeclareOptions::default()
            },
            FieldTable::default(),
        )
        .await
        .map_err(|e| ParcelError::Broker(format!("exchange declare failed: {}", e)))?;

    channel
        .queue_declare(
            &settings.queue,
            QueueDeclareOptions {
                durable: true,
                ..QueueDeclareOptions::default()
            },
            FieldTable::default(),
        )
        .await
        .map_err(|e| ParcelError::Broker(format!("queue declare failed: {}", e)))?;

    for event_type in EventType::all() {
        channel
            .queue_bind(
                &settings.queue,
                &settings.exchange,
                event_type.as_str(),
                QueueBindOptions::default(),
                FieldTable::default(),
            )
            .await
            .map_err(|e| ParcelError::Broker(format!("queue bind failed: {}", e)))?;
        info!(routing_key = %event_type, "bound queue to routing key");
    }

    info!(exchange = %settings.exchange, queue = %settings.queue, "initialized RabbitMQ topology");

    connection
        .close(0, "topology initialized")
        .await
        .map_err(|e| ParcelError::Broker(format!("close failed: {}", e)))?;

    Ok(())
}
