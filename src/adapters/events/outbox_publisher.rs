//! Outbox publisher - drains unpublished events into the broker.
//!
//! Second half of the transactional outbox pattern: request handlers write
//! events to the `outbox_events` table in the same transaction as business
//! state, and this loop claims unapplied rows, publishes them to the
//! exchange, and marks them applied.
//!
//! Delivery is at-least-once: a crash between a broker confirm and the
//! mark-applied write re-publishes the row on the next iteration, and the
//! worker's idempotent insert absorbs the duplicate.

use std::sync::Arc;
use std::time::Duration;

use metrics::counter;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::domain::ParcelError;
use crate::ports::{EventPublisher, OutboxStore};

/// Publisher loop configuration.
#[derive(Debug, Clone)]
pub struct OutboxPublisherConfig {
    /// Max rows claimed per iteration.
    pub batch_size: u32,

    /// Sleep between iterations when the queue is empty or the broker is
    /// unreachable.
    pub sleep_interval: Duration,
}

impl Default for OutboxPublisherConfig {
    fn default() -> Self {
        Self {
            batch_size: 50,
            sleep_interval: Duration::from_secs(5),
        }
    }
}

/// Result of one batch iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchOutcome {
    /// Rows confirmed by the broker and marked applied.
    pub published: usize,
    /// The batch broke on a broker connection failure. A single rejected
    /// message does not set this; its row simply stays unapplied.
    pub broker_error: bool,
}

/// Long-running publisher task.
///
/// Multiple processes may run this loop concurrently: the store's
/// skip-locked claim keeps them from publishing the same row at the same
/// time, and ordering within one publisher follows `created_at`.
pub struct OutboxPublisher {
    store: Arc<dyn OutboxStore>,
    publisher: Arc<dyn EventPublisher>,
    config: OutboxPublisherConfig,
}

impl OutboxPublisher {
    pub fn new(store: Arc<dyn OutboxStore>, publisher: Arc<dyn EventPublisher>) -> Self {
        Self {
            store,
            publisher,
            config: OutboxPublisherConfig::default(),
        }
    }

    pub fn with_config(
        store: Arc<dyn OutboxStore>,
        publisher: Arc<dyn EventPublisher>,
        config: OutboxPublisherConfig,
    ) -> Self {
        Self {
            store,
            publisher,
            config,
        }
    }

    /// Runs until the shutdown signal flips to `true`.
    ///
    /// A saturated queue is drained at full speed (one batch per iteration);
    /// an empty queue or a broker failure backs off for `sleep_interval`.
    /// Database errors are logged and retried, never fatal.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        info!(
            batch_size = self.config.batch_size,
            sleep_secs = self.config.sleep_interval.as_secs(),
            "outbox publisher loop started"
        );

        loop {
            if *shutdown.borrow() {
                info!("shutdown requested, stopping publisher");
                return;
            }

            let backoff = match self.process_batch().await {
                Ok(outcome) => outcome.published == 0 || outcome.broker_error,
                Err(e) => {
                    warn!(error = %e, "failed to process outbox batch");
                    true
                }
            };

            if backoff {
                tokio::select! {
                    _ = tokio::time::sleep(self.config.sleep_interval) => {}
                    _ = shutdown.changed() => {}
                }
            }
        }
    }

    /// Processes a single batch. Exposed for tests and for drain-on-shutdown.
    pub async fn process_batch(&self) -> Result<BatchOutcome, ParcelError> {
        let events = self.store.fetch_pending(self.config.batch_size as i64).await?;

        if events.is_empty() {
            debug!("no pending outbox events");
            return Ok(BatchOutcome {
                published: 0,
                broker_error: false,
            });
        }

        info!(count = events.len(), "fetched outbox events for publishing");

        let mut success_ids = Vec::with_capacity(events.len());
        let mut broker_error = false;

        for event in &events {
            match self
                .publisher
                .publish(&event.event_type, &event.to_message())
                .await
            {
                Ok(()) => {
                    debug!(event_id = %event.id, event_type = %event.event_type, "event published");
                    success_ids.push(event.id.clone());
                }
                Err(e) if e.is_connection_error() => {
                    // Connection-level failure: stop the batch, keep the
                    // remaining rows unapplied, let the loop back off.
                    warn!(event_id = %event.id, error = %e, "broker connection lost, breaking batch");
                    counter!("outbox_publish_failures_total").increment(1);
                    broker_error = true;
                    break;
                }
                Err(e) => {
                    // Single-message failure (e.g. a nack): record it, leave
                    // the row unapplied for a later retry, move on.
                    warn!(event_id = %event.id, error = %e, "failed to publish event");
                    counter!("outbox_publish_failures_total").increment(1);
                }
            }
        }

        // Rows confirmed before a mid-batch failure are still applied.
        self.store.mark_applied(&success_ids).await?;
        if !success_ids.is_empty() {
            info!(count = success_ids.len(), "marked events as applied");
            counter!("outbox_events_published_total").increment(success_ids.len() as u64);
        }

        Ok(BatchOutcome {
            published: success_ids.len(),
            broker_error,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{InMemoryEventPublisher, InMemoryOutboxStore};
    use crate::domain::{OutboxEvent, RegisteredParcelPayload};

    fn registered_event(n: u32) -> OutboxEvent {
        let payload = RegisteredParcelPayload {
            parcel_id: format!("parcel-{}", n),
            session_id: "session-1".to_string(),
            name: format!("Parcel {}", n),
            weight_kg: 1.5,
            type_id: 1,
            cost_adjustment_usd: 2.0,
        };
        OutboxEvent::registered(&payload).unwrap()
    }

    fn publisher(
        store: Arc<InMemoryOutboxStore>,
        broker: Arc<InMemoryEventPublisher>,
        batch_size: u32,
    ) -> OutboxPublisher {
        OutboxPublisher::with_config(
            store,
            broker,
            OutboxPublisherConfig {
                batch_size,
                sleep_interval: Duration::from_millis(10),
            },
        )
    }

    #[tokio::test]
    async fn empty_outbox_publishes_nothing() {
        let store = Arc::new(InMemoryOutboxStore::new());
        let broker = Arc::new(InMemoryEventPublisher::new());
        let publisher = publisher(store, broker.clone(), 10);

        let outcome = publisher.process_batch().await.unwrap();

        assert_eq!(outcome.published, 0);
        assert!(!outcome.broker_error);
        assert_eq!(broker.published_count().await, 0);
    }

    #[tokio::test]
    async fn pending_events_are_published_and_marked_applied() {
        let store = Arc::new(InMemoryOutboxStore::new());
        let broker = Arc::new(InMemoryEventPublisher::new());

        store.push(registered_event(1)).await;
        store.push(registered_event(2)).await;
        store.push(OutboxEvent::recalculate()).await;

        let publisher = publisher(store.clone(), broker.clone(), 10);
        let outcome = publisher.process_batch().await.unwrap();

        assert_eq!(outcome.published, 3);
        assert_eq!(store.pending_count().await, 0);
        assert_eq!(store.applied_ids().await.len(), 3);

        let published = broker.published().await;
        assert_eq!(published[0].routing_key, "parcel.registered");
        assert_eq!(published[2].routing_key, "parcel.recalculate");
    }

    #[tokio::test]
    async fn batch_size_limits_one_iteration() {
        let store = Arc::new(InMemoryOutboxStore::new());
        let broker = Arc::new(InMemoryEventPublisher::new());

        for n in 0..5 {
            store.push(registered_event(n)).await;
        }

        let publisher = publisher(store.clone(), broker.clone(), 2);

        assert_eq!(publisher.process_batch().await.unwrap().published, 2);
        assert_eq!(publisher.process_batch().await.unwrap().published, 2);
        assert_eq!(publisher.process_batch().await.unwrap().published, 1);
        assert_eq!(store.pending_count().await, 0);
    }

    #[tokio::test]
    async fn applied_events_carry_published_at() {
        let store = Arc::new(InMemoryOutboxStore::new());
        let broker = Arc::new(InMemoryEventPublisher::new());

        let event = registered_event(1);
        let id = event.id.clone();
        store.push(event).await;

        publisher(store.clone(), broker, 10)
            .process_batch()
            .await
            .unwrap();

        let applied = store.get(&id).await.unwrap();
        assert!(applied.applied);
        assert!(applied.published_at.is_some());
    }

    #[tokio::test]
    async fn broker_loss_mid_batch_keeps_confirmed_rows_applied() {
        let store = Arc::new(InMemoryOutboxStore::new());
        let broker = Arc::new(InMemoryEventPublisher::new());

        for n in 0..4 {
            store.push(registered_event(n)).await;
        }
        broker.fail_after(2);

        let publisher = publisher(store.clone(), broker.clone(), 10);
        let outcome = publisher.process_batch().await.unwrap();

        // Two confirmed before the connection dropped; the rest stay pending.
        assert_eq!(outcome.published, 2);
        assert!(outcome.broker_error);
        assert_eq!(store.applied_ids().await.len(), 2);
        assert_eq!(store.pending_count().await, 2);
    }

    #[tokio::test]
    async fn nacked_message_is_recorded_and_batch_continues() {
        let store = Arc::new(InMemoryOutboxStore::new());
        let broker = Arc::new(InMemoryEventPublisher::new());

        for n in 0..3 {
            store.push(registered_event(n)).await;
        }
        // Second publish call is rejected by the broker.
        broker.nack_call(1).await;

        let publisher = publisher(store.clone(), broker.clone(), 10);
        let outcome = publisher.process_batch().await.unwrap();

        // The rejected row stays unapplied but the batch runs to the end.
        assert_eq!(outcome.published, 2);
        assert!(!outcome.broker_error);
        assert_eq!(store.pending_count().await, 1);

        // The next iteration retries just the rejected row.
        let outcome = publisher.process_batch().await.unwrap();
        assert_eq!(outcome.published, 1);
        assert!(!outcome.broker_error);
        assert_eq!(store.pending_count().await, 0);
    }

    #[tokio::test]
    async fn retry_after_broker_loss_republishes_remaining() {
        let store = Arc::new(InMemoryOutboxStore::new());
        let broker = Arc::new(InMemoryEventPublisher::new());

        for n in 0..3 {
            store.push(registered_event(n)).await;
        }
        broker.fail_after(1);

        let publisher = publisher(store.clone(), broker.clone(), 10);
        let first = publisher.process_batch().await.unwrap();
        assert_eq!(first.published, 1);
        assert!(first.broker_error);

        // Broker back up.
        broker.fail_after(usize::MAX);
        let second = publisher.process_batch().await.unwrap();
        assert_eq!(second.published, 2);
        assert!(!second.broker_error);
        assert_eq!(store.pending_count().await, 0);
    }

    #[tokio::test]
    async fn run_stops_on_shutdown_signal() {
        let store = Arc::new(InMemoryOutboxStore::new());
        let broker = Arc::new(InMemoryEventPublisher::new());
        store.push(registered_event(1)).await;

        let publisher = publisher(store.clone(), broker.clone(), 10);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let handle = tokio::spawn(async move { publisher.run(shutdown_rx).await });

        tokio::time::sleep(Duration::from_millis(50)).await;
        shutdown_tx.send(true).unwrap();
        handle.await.unwrap();

        assert_eq!(broker.published_count().await, 1);
        assert_eq!(store.pending_count().await, 0);
    }
}
