//! RabbitMQ event publisher with publisher confirms.

use async_trait::async_trait;
use lapin::options::{BasicPublishOptions, ConfirmSelectOptions};
use lapin::publisher_confirm::Confirmation;
use lapin::{BasicProperties, Channel, Connection, ConnectionProperties};
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::config::RabbitMqSettings;
use crate::domain::{BrokerMessage, ParcelError};
use crate::ports::EventPublisher;

/// Publishes broker messages to the configured exchange.
///
/// The connection is (re)established lazily: a connection-level failure drops
/// the cached channel and the next publish reconnects, so the outbox loop
/// survives broker restarts without special handling. Publisher confirms are
/// enabled on every channel; `publish` only returns `Ok` once the broker
/// acked the message.
pub struct RabbitEventPublisher {
    settings: RabbitMqSettings,
    // The connection handle must outlive its channel, so both are cached.
    link: Mutex<Option<(Connection, Channel)>>,
}

impl RabbitEventPublisher {
    pub fn new(settings: RabbitMqSettings) -> Self {
        Self {
            settings,
            link: Mutex::new(None),
        }
    }

    async fn open_link(&self) -> Result<(Connection, Channel), ParcelError> {
        let connection = Connection::connect(&self.settings.url, ConnectionProperties::default())
            .await
            .map_err(|e| ParcelError::BrokerConnection(format!("connect failed: {}", e)))?;

        let channel = connection
            .create_channel()
            .await
            .map_err(|e| ParcelError::BrokerConnection(format!("channel open failed: {}", e)))?;

        channel
            .confirm_select(ConfirmSelectOptions::default())
            .await
            .map_err(|e| ParcelError::BrokerConnection(format!("confirm_select failed: {}", e)))?;

        info!(exchange = %self.settings.exchange, "connected to RabbitMQ exchange");
        Ok((connection, channel))
    }
}

#[async_trait]
impl EventPublisher for RabbitEventPublisher {
    async fn publish(&self, routing_key: &str, message: &BrokerMessage) -> Result<(), ParcelError> {
        let body = message.to_bytes()?;

        let mut guard = self.link.lock().await;
        if guard.is_none() {
            *guard = Some(self.open_link().await?);
        }
        let channel = &guard.as_ref().expect("link populated above").1;

        let result = channel
            .basic_publish(
                &self.settings.exchange,
                routing_key,
                BasicPublishOptions::default(),
                &body,
                BasicProperties::default()
                    .with_content_type("application/json".into())
                    .with_delivery_mode(2), // persistent
            )
            .await;

        let confirm = match result {
            Ok(promise) => promise.await,
            Err(e) => {
                warn!(error = %e, "publish failed, dropping connection");
                *guard = None;
                return Err(ParcelError::BrokerConnection(format!(
                    "publish failed: {}",
                    e
                )));
            }
        };

        match confirm {
            // A nack rejects this one message; the link itself is fine.
            Ok(Confirmation::Nack(_)) => Err(ParcelError::Broker(
                "broker nacked the message".to_string(),
            )),
            Ok(_) => Ok(()),
            Err(e) => {
                warn!(error = %e, "confirm failed, dropping connection");
                *guard = None;
                Err(ParcelError::BrokerConnection(format!(
                    "confirm failed: {}",
                    e
                )))
            }
        }
    }
}
