//! In-memory event publisher.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::{BrokerMessage, ParcelError};
use crate::ports::EventPublisher;

/// A message captured by the in-memory publisher.
#[derive(Debug, Clone)]
pub struct PublishedMessage {
    pub routing_key: String,
    pub message: BrokerMessage,
}

/// Publisher that records messages and can script failures: a simulated
/// connection loss after a set number of successful publishes, or a
/// per-message nack for specific publish calls.
pub struct InMemoryEventPublisher {
    published: RwLock<Vec<PublishedMessage>>,
    calls: AtomicUsize,
    fail_after: AtomicUsize,
    nack_calls: RwLock<HashSet<usize>>,
}

impl Default for InMemoryEventPublisher {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryEventPublisher {
    pub fn new() -> Self {
        Self {
            published: RwLock::new(Vec::new()),
            calls: AtomicUsize::new(0),
            fail_after: AtomicUsize::new(usize::MAX),
            nack_calls: RwLock::new(HashSet::new()),
        }
    }

    /// Makes the publisher fail with a connection error after `n` more
    /// successful publishes.
    pub fn fail_after(&self, n: usize) {
        self.fail_after.store(n, Ordering::SeqCst);
    }

    /// Nacks the publish call with the given zero-based index (nacked calls
    /// count toward the index too).
    pub async fn nack_call(&self, call: usize) {
        self.nack_calls.write().await.insert(call);
    }

    pub async fn published(&self) -> Vec<PublishedMessage> {
        self.published.read().await.clone()
    }

    pub async fn published_count(&self) -> usize {
        self.published.read().await.len()
    }
}

#[async_trait]
impl EventPublisher for InMemoryEventPublisher {
    async fn publish(&self, routing_key: &str, message: &BrokerMessage) -> Result<(), ParcelError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if self.nack_calls.read().await.contains(&call) {
            return Err(ParcelError::Broker("broker nacked the message".to_string()));
        }

        let remaining = self.fail_after.load(Ordering::SeqCst);
        if remaining == 0 {
            return Err(ParcelError::BrokerConnection("connection lost".to_string()));
        }
        if remaining != usize::MAX {
            self.fail_after.store(remaining - 1, Ordering::SeqCst);
        }

        self.published.write().await.push(PublishedMessage {
            routing_key: routing_key.to_string(),
            message: message.clone(),
        });
        Ok(())
    }
}
