//! Outbox table access for the write path.

use sqlx::postgres::PgConnection;
use sqlx::{Postgres, Transaction};

use crate::domain::{OutboxEvent, ParcelError};

/// Transaction-scoped repository for inserting and reading outbox rows.
///
/// Inserts happen in the same transaction as any derived business state;
/// that atomicity is the core of the outbox pattern.
pub struct OutboxRepository<'t> {
    conn: &'t mut PgConnection,
}

impl<'t> OutboxRepository<'t> {
    pub(super) fn new(tx: &'t mut Transaction<'static, Postgres>) -> Self {
        Self { conn: &mut *tx }
    }

    /// Inserts an outbox event. A duplicate primary key maps to
    /// `OutboxDuplicate`, which callers treat as idempotent success; any
    /// other database failure maps to `OutboxPersistence`.
    pub async fn add(&mut self, event: &OutboxEvent) -> Result<(), ParcelError> {
        sqlx::query(
            r#"
            INSERT INTO outbox_events (
                id, parcel_id, session_id, event_type, payload, applied, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(&event.id)
        .bind(&event.parcel_id)
        .bind(&event.session_id)
        .bind(&event.event_type)
        .bind(&event.payload)
        .bind(event.applied)
        .bind(event.created_at)
        .execute(&mut *self.conn)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => ParcelError::OutboxDuplicate,
            _ => ParcelError::OutboxPersistence(e.to_string()),
        })?;

        Ok(())
    }

    /// Finds the registration event for a parcel (detail-query fallback while
    /// the durable row does not exist yet).
    pub async fn find_by_parcel_id(
        &mut self,
        parcel_id: &str,
    ) -> Result<Option<OutboxEvent>, ParcelError> {
        let event = sqlx::query_as::<_, OutboxEvent>(
            r#"
            SELECT id, parcel_id, session_id, event_type, payload, applied,
                   created_at, published_at
            FROM outbox_events
            WHERE parcel_id = $1
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(parcel_id)
        .fetch_optional(&mut *self.conn)
        .await
        .map_err(|e| ParcelError::Database(format!("failed to fetch outbox event: {}", e)))?;

        Ok(event)
    }
}
