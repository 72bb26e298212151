//! In-memory outbox store.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::domain::{OutboxEvent, ParcelError};
use crate::ports::OutboxStore;

/// Outbox store backed by a vector, preserving insertion order.
#[derive(Default)]
pub struct InMemoryOutboxStore {
    events: RwLock<Vec<OutboxEvent>>,
}

impl InMemoryOutboxStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn push(&self, event: OutboxEvent) {
        self.events.write().await.push(event);
    }

    pub async fn pending_count(&self) -> usize {
        self.events.read().await.iter().filter(|e| !e.applied).count()
    }

    pub async fn applied_ids(&self) -> Vec<String> {
        self.events
            .read()
            .await
            .iter()
            .filter(|e| e.applied)
            .map(|e| e.id.clone())
            .collect()
    }

    pub async fn get(&self, id: &str) -> Option<OutboxEvent> {
        self.events.read().await.iter().find(|e| e.id == id).cloned()
    }
}

#[async_trait]
impl OutboxStore for InMemoryOutboxStore {
    async fn fetch_pending(&self, limit: i64) -> Result<Vec<OutboxEvent>, ParcelError> {
        let events = self.events.read().await;
        Ok(events
            .iter()
            .filter(|e| !e.applied)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn mark_applied(&self, ids: &[String]) -> Result<(), ParcelError> {
        let mut events = self.events.write().await;
        let now = Utc::now();
        for event in events.iter_mut() {
            if ids.contains(&event.id) {
                event.applied = true;
                event.published_at = Some(now);
            }
        }
        Ok(())
    }
}
