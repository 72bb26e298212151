//! Combined parcels + outbox read model.
//!
//! Writes register parcels through the outbox only, so a freshly registered
//! parcel exists solely as an unapplied `parcel.registered` event until the
//! worker inserts the durable row. Reads union both projections and
//! deduplicate by `parcel_id`, with the durable `parcels` row shadowing any
//! lingering outbox copy.

use sqlx::postgres::PgConnection;
use sqlx::{Postgres, Row, Transaction};

use crate::domain::{EventType, OutboxEvent, Parcel, ParcelError};

/// Which projection a deduplicated row came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowSource {
    Parcel,
    Outbox,
}

impl RowSource {
    fn parse(s: &str) -> RowSource {
        if s == "parcel" {
            RowSource::Parcel
        } else {
            RowSource::Outbox
        }
    }
}

/// One page entry: the parcel id and the projection to hydrate it from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CombinedRow {
    pub parcel_id: String,
    pub source: RowSource,
}

/// Transaction-scoped reader over the unified row set.
pub struct CombinedParcelReader<'t> {
    conn: &'t mut PgConnection,
}

const UNIFIED_CTE: &str = r#"
    WITH unified AS (
        SELECT p.id AS parcel_id,
               p.created_at,
               p.type_id,
               p.delivery_price_rub,
               'parcel' AS source
        FROM parcels p
        WHERE p.session_id = $1
          AND ($2::int IS NULL OR p.type_id = $2)

        UNION ALL

        SELECT o.payload->>'parcel_id' AS parcel_id,
               o.created_at,
               (o.payload->>'type_id')::int AS type_id,
               (o.payload->>'delivery_price_rub')::float8 AS delivery_price_rub,
               'outbox' AS source
        FROM outbox_events o
        WHERE o.session_id = $1
          AND o.event_type = 'parcel.registered'
          AND o.applied = FALSE
          AND ($2::int IS NULL OR (o.payload->>'type_id')::int = $2)
    ),
    ranked AS (
        SELECT parcel_id,
               delivery_price_rub,
               source,
               ROW_NUMBER() OVER (
                   PARTITION BY parcel_id
                   ORDER BY (source = 'parcel') DESC, created_at DESC
               ) AS rn
        FROM unified
    )
"#;

impl<'t> CombinedParcelReader<'t> {
    pub(super) fn new(tx: &'t mut Transaction<'static, Postgres>) -> Self {
        Self { conn: &mut *tx }
    }

    /// Counts deduplicated parcels for a session, optionally restricted to
    /// rows with a calculated delivery price.
    pub async fn count(
        &mut self,
        session_id: &str,
        type_id: Option<i32>,
        has_delivery_price: bool,
    ) -> Result<i64, ParcelError> {
        let mut sql = format!("{UNIFIED_CTE} SELECT COUNT(*) FROM ranked WHERE rn = 1");
        if has_delivery_price {
            sql.push_str(" AND delivery_price_rub IS NOT NULL");
        }

        let count: i64 = sqlx::query_scalar(&sql)
            .bind(session_id)
            .bind(type_id)
            .fetch_one(&mut *self.conn)
            .await
            .map_err(|e| ParcelError::Database(format!("failed to count parcels: {}", e)))?;

        Ok(count)
    }

    /// One page of `(parcel_id, source)` for deduplicated rows.
    pub async fn list_page(
        &mut self,
        session_id: &str,
        type_id: Option<i32>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<CombinedRow>, ParcelError> {
        let sql = format!(
            "{UNIFIED_CTE}
             SELECT parcel_id, source
             FROM ranked
             WHERE rn = 1
             ORDER BY parcel_id
             LIMIT $3 OFFSET $4"
        );

        let rows = sqlx::query(&sql)
            .bind(session_id)
            .bind(type_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(&mut *self.conn)
            .await
            .map_err(|e| ParcelError::Database(format!("failed to list parcels: {}", e)))?;

        Ok(rows
            .into_iter()
            .map(|row| CombinedRow {
                parcel_id: row.get("parcel_id"),
                source: RowSource::parse(row.get::<&str, _>("source")),
            })
            .collect())
    }

    /// Bulk-loads durable parcel rows for hydration.
    pub async fn parcels_by_ids(&mut self, ids: &[String]) -> Result<Vec<Parcel>, ParcelError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let parcels = sqlx::query_as::<_, Parcel>(
            r#"
            SELECT id, session_id, name, weight_kg, type_id, cost_adjustment_usd,
                   delivery_price_rub, company_id, created_at, updated_at
            FROM parcels
            WHERE id = ANY($1)
            "#,
        )
        .bind(ids)
        .fetch_all(&mut *self.conn)
        .await
        .map_err(|e| ParcelError::Database(format!("failed to load parcels: {}", e)))?;

        Ok(parcels)
    }

    /// Bulk-loads registration events for hydration of outbox-only parcels.
    pub async fn outbox_by_parcel_ids(
        &mut self,
        ids: &[String],
    ) -> Result<Vec<OutboxEvent>, ParcelError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let events = sqlx::query_as::<_, OutboxEvent>(
            r#"
            SELECT id, parcel_id, session_id, event_type, payload, applied,
                   created_at, published_at
            FROM outbox_events
            WHERE parcel_id = ANY($1) AND event_type = $2
            "#,
        )
        .bind(ids)
        .bind(EventType::ParcelRegistered.as_str())
        .fetch_all(&mut *self.conn)
        .await
        .map_err(|e| ParcelError::Database(format!("failed to load outbox events: {}", e)))?;

        Ok(events)
    }
}
