//! Publisher-side outbox store.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::{OutboxEvent, ParcelError};
use crate::ports::OutboxStore;

/// PostgreSQL implementation of the publisher's work queue.
///
/// `fetch_pending` claims rows under `FOR UPDATE SKIP LOCKED` inside its own
/// short transaction, so a second publisher scanning concurrently skips the
/// claimed rows instead of blocking. The claim transaction commits before
/// publishing; a row that was claimed but not yet marked applied can
/// therefore be re-claimed later, which at-least-once delivery and the
/// worker's idempotent insert absorb.
pub struct PgOutboxStore {
    pool: PgPool,
}

impl PgOutboxStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OutboxStore for PgOutboxStore {
    async fn fetch_pending(&self, limit: i64) -> Result<Vec<OutboxEvent>, ParcelError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| ParcelError::Database(format!("failed to begin claim: {}", e)))?;

        let events = sqlx::query_as::<_, OutboxEvent>(
            r#"
            SELECT id, parcel_id, session_id, event_type, payload, applied,
                   created_at, published_at
            FROM outbox_events
            WHERE applied = FALSE
            ORDER BY created_at
            LIMIT $1
            FOR UPDATE SKIP LOCKED
            "#,
        )
        .bind(limit)
        .fetch_all(&mut *tx)
        .await
        .map_err(|e| ParcelError::Database(format!("failed to fetch outbox batch: {}", e)))?;

        tx.commit()
            .await
            .map_err(|e| ParcelError::Database(format!("failed to commit claim: {}", e)))?;

        Ok(events)
    }

    async fn mark_applied(&self, ids: &[String]) -> Result<(), ParcelError> {
        if ids.is_empty() {
            return Ok(());
        }

        sqlx::query(
            r#"
            UPDATE outbox_events
            SET applied = TRUE, published_at = NOW()
            WHERE id = ANY($1)
            "#,
        )
        .bind(ids)
        .execute(&self.pool)
        .await
        .map_err(|e| ParcelError::Database(format!("failed to mark events applied: {}", e)))?;

        Ok(())
    }
}
