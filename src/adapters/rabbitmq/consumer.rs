//! RabbitMQ consumer runtime for the delivery worker.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::{StreamExt, TryStreamExt};
use lapin::options::{BasicAckOptions, BasicConsumeOptions, BasicQosOptions, QueueDeclareOptions};
use lapin::types::FieldTable;
use lapin::{Connection, ConnectionProperties};
use tokio::sync::watch;
use tracing::{error, info, warn};

use crate::config::RabbitMqSettings;
use crate::domain::ParcelError;

/// What happened to one delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// A strategy ran to completion.
    Handled,
    /// Unknown or missing event type; the message is dropped.
    Dropped,
    /// Decode or strategy failure; the message is dropped after logging.
    Failed,
}

/// Message handling seam between the consumer runtime and the strategies.
#[async_trait]
pub trait MessageDispatcher: Send + Sync {
    async fn dispatch(&self, body: &[u8]) -> DispatchOutcome;
}

/// Consumer loop with reconnect semantics.
///
/// Deliveries are dispatched with bounded concurrency: up to
/// `prefetch_count` messages are in flight at once, so strategies must be
/// order-independent (the register strategy is id-idempotent, recalculate is
/// set-based). Every delivery is acknowledged from its own task regardless
/// of outcome: a failing message is logged and dropped rather than
/// redelivered forever. The queue is declared passively; topology belongs to
/// the init-topology binary.
pub struct RabbitConsumer {
    settings: RabbitMqSettings,
    dispatcher: Arc<dyn MessageDispatcher>,
    retry_delay: Duration,
}

impl RabbitConsumer {
    pub fn new(settings: RabbitMqSettings, dispatcher: Arc<dyn MessageDispatcher>) -> Self {
        Self {
            settings,
            dispatcher,
            retry_delay: Duration::from_secs(5),
        }
    }

    /// Runs until the shutdown signal flips. Connection failures reconnect
    /// after `retry_delay`; in-flight messages finish before exit.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> Result<(), ParcelError> {
        loop {
            if *shutdown.borrow() {
                return Ok(());
            }

            match self.consume_until_error(&shutdown).await {
                Ok(()) => return Ok(()),
                Err(e) => {
                    warn!(error = %e, retry_secs = self.retry_delay.as_secs(), "consumer connection lost, reconnecting");
                    tokio::select! {
                        _ = tokio::time::sleep(self.retry_delay) => {}
                        _ = shutdown.changed() => {}
                    }
                }
            }
        }
    }

    async fn consume_until_error(
        &self,
        shutdown: &watch::Receiver<bool>,
    ) -> Result<(), ParcelError> {
        let connection = Connection::connect(&self.settings.url, ConnectionProperties::default())
            .await
            .map_err(|e| ParcelError::BrokerConnection(format!("connect failed: {}", e)))?;

        let channel = connection
            .create_channel()
            .await
            .map_err(|e| ParcelError::BrokerConnection(format!("channel open failed: {}", e)))?;

        channel
            .basic_qos(self.settings.prefetch_count, BasicQosOptions::default())
            .await
            .map_err(|e| ParcelError::BrokerConnection(format!("qos failed: {}", e)))?;

        // Passive declare: fail fast if the initializer has not run.
        channel
            .queue_declare(
                &self.settings.queue,
                QueueDeclareOptions {
                    passive: true,
                    ..QueueDeclareOptions::default()
                },
                FieldTable::default(),
            )
            .await
            .map_err(|e| ParcelError::BrokerConnection(format!("queue not available: {}", e)))?;

        let consumer = channel
            .basic_consume(
                &self.settings.queue,
                &self.settings.consumer_tag,
                BasicConsumeOptions::default(),
                FieldTable::default(),
            )
            .await
            .map_err(|e| ParcelError::BrokerConnection(format!("consume failed: {}", e)))?;

        info!(queue = %self.settings.queue, prefetch = self.settings.prefetch_count, "consuming messages");

        // Resolves once shutdown flips true (or its sender goes away), which
        // stops the stream from yielding further deliveries.
        let mut stop_rx = shutdown.clone();
        let stop = async move {
            if *stop_rx.borrow() {
                return;
            }
            while stop_rx.changed().await.is_ok() {
                if *stop_rx.borrow() {
                    return;
                }
            }
        };

        let dispatcher = self.dispatcher.clone();
        let result = consumer
            .take_until(stop)
            .try_for_each_concurrent(self.settings.prefetch_count as usize, move |delivery| {
                let dispatcher = dispatcher.clone();
                async move {
                    let outcome = dispatcher.dispatch(&delivery.data).await;
                    if outcome == DispatchOutcome::Failed {
                        error!("message processing failed, dropping");
                    }
                    delivery.ack(BasicAckOptions::default()).await
                }
            })
            .await;

        match result {
            Err(e) => Err(ParcelError::BrokerConnection(format!(
                "delivery failed: {}",
                e
            ))),
            Ok(()) => {
                if *shutdown.borrow() {
                    info!("shutdown requested, stopping consumer");
                    Ok(())
                } else {
                    Err(ParcelError::BrokerConnection(
                        "consumer stream closed".to_string(),
                    ))
                }
            }
        }
    }
}
