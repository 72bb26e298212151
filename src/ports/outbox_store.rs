//! OutboxStore port - the publisher's view of the outbox table.

use async_trait::async_trait;

use crate::domain::{OutboxEvent, ParcelError};

/// Work-queue access to unpublished outbox rows.
///
/// `fetch_pending` claims up to `limit` rows with `applied = false` in
/// `created_at` order. The postgres implementation claims under
/// `FOR UPDATE SKIP LOCKED` so concurrent publishers never block on each
/// other; rows claimed by another publisher are simply not returned.
///
/// `mark_applied` flips the rows to `applied = true` and stamps
/// `published_at`. It runs in its own transaction: a crash between a broker
/// confirm and the mark leaves the row unapplied, which re-publishes it on
/// the next iteration (at-least-once delivery).
#[async_trait]
pub trait OutboxStore: Send + Sync {
    async fn fetch_pending(&self, limit: i64) -> Result<Vec<OutboxEvent>, ParcelError>;

    async fn mark_applied(&self, ids: &[String]) -> Result<(), ParcelError>;
}
