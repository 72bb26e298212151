//! Parcel list use case over the combined read model.

use std::collections::HashMap;

use sqlx::PgPool;
use tracing::debug;

use crate::adapters::postgres::{CombinedRow, RowSource, UnitOfWork};
use crate::domain::{OutboxEvent, Parcel, ParcelError};

use super::get_parcel::ParcelDetail;

/// Filter and pagination parameters for the list endpoint.
#[derive(Debug, Clone)]
pub struct ListParcelsQuery {
    pub session_id: String,
    pub type_id: Option<i32>,
    pub has_delivery_price: bool,
    pub limit: i64,
    pub offset: i64,
}

/// One page of parcels plus the deduplicated total.
#[derive(Debug, Clone)]
pub struct ParcelList {
    pub items: Vec<ParcelDetail>,
    pub total: i64,
}

/// Serves the session's parcels, merging the durable table with pending
/// outbox registrations so a just-registered parcel never disappears from
/// the list.
pub struct ListParcelsHandler {
    pool: PgPool,
}

impl ListParcelsHandler {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn handle(&self, query: ListParcelsQuery) -> Result<ParcelList, ParcelError> {
        let mut uow = UnitOfWork::begin(&self.pool).await?;
        let mut combined = uow.combined();

        let rows = combined
            .list_page(
                &query.session_id,
                query.type_id,
                query.limit,
                query.offset,
            )
            .await?;
        let total = combined
            .count(&query.session_id, query.type_id, query.has_delivery_price)
            .await?;

        let parcel_ids: Vec<String> = rows
            .iter()
            .filter(|r| r.source == RowSource::Parcel)
            .map(|r| r.parcel_id.clone())
            .collect();
        let outbox_ids: Vec<String> = rows
            .iter()
            .filter(|r| r.source == RowSource::Outbox)
            .map(|r| r.parcel_id.clone())
            .collect();

        let parcels = combined.parcels_by_ids(&parcel_ids).await?;
        let events = combined.outbox_by_parcel_ids(&outbox_ids).await?;
        uow.commit().await?;

        debug!(
            rows = rows.len(),
            total,
            "hydrating combined parcel page"
        );

        let items = merge_details(&rows, &parcels, &events, query.has_delivery_price);
        Ok(ParcelList { items, total })
    }
}

/// Hydrates page rows into detail objects, preserving the page order.
///
/// When `has_delivery_price` is set, unpriced parcels are dropped from the
/// hydrated items (the count query applies the same filter).
pub fn merge_details(
    rows: &[CombinedRow],
    parcels: &[Parcel],
    events: &[OutboxEvent],
    has_delivery_price: bool,
) -> Vec<ParcelDetail> {
    let mut by_id: HashMap<&str, ParcelDetail> = HashMap::new();

    for parcel in parcels {
        by_id.insert(parcel.id.as_str(), ParcelDetail::from_parcel(parcel));
    }
    for event in events {
        if let (Some(parcel_id), Some(detail)) =
            (event.parcel_id.as_deref(), ParcelDetail::from_outbox_event(event))
        {
            by_id.entry(parcel_id).or_insert(detail);
        }
    }

    rows.iter()
        .filter_map(|row| by_id.get(row.parcel_id.as_str()).cloned())
        .filter(|detail| !has_delivery_price || detail.delivery_price_rub.is_some())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    fn parcel(id: &str, price: Option<f64>) -> Parcel {
        Parcel {
            id: id.to_string(),
            session_id: "s-1".to_string(),
            name: format!("Parcel {}", id),
            weight_kg: 1.0,
            type_id: 1,
            cost_adjustment_usd: 5.0,
            delivery_price_rub: price,
            company_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn outbox(id: &str) -> OutboxEvent {
        OutboxEvent {
            id: format!("evt-{}", id),
            parcel_id: Some(id.to_string()),
            session_id: Some("s-1".to_string()),
            event_type: "parcel.registered".to_string(),
            payload: Some(json!({
                "parcel_id": id,
                "session_id": "s-1",
                "name": format!("Parcel {}", id),
                "weight_kg": 1.0,
                "type_id": 1,
                "cost_adjustment_usd": 5.0
            })),
            applied: false,
            created_at: Utc::now(),
            published_at: None,
        }
    }

    fn row(id: &str, source: RowSource) -> CombinedRow {
        CombinedRow {
            parcel_id: id.to_string(),
            source,
        }
    }

    #[test]
    fn hydration_preserves_page_order() {
        let rows = vec![
            row("b", RowSource::Outbox),
            row("a", RowSource::Parcel),
            row("c", RowSource::Parcel),
        ];
        let parcels = vec![parcel("a", Some(10.0)), parcel("c", Some(20.0))];
        let events = vec![outbox("b")];

        let items = merge_details(&rows, &parcels, &events, false);
        let ids: Vec<&str> = items.iter().map(|i| i.parcel_id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a", "c"]);
    }

    #[test]
    fn price_filter_drops_unpriced_items() {
        let rows = vec![
            row("a", RowSource::Parcel),
            row("b", RowSource::Parcel),
            row("c", RowSource::Outbox),
        ];
        let parcels = vec![parcel("a", Some(10.0)), parcel("b", None)];
        let events = vec![outbox("c")];

        let items = merge_details(&rows, &parcels, &events, true);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].parcel_id, "a");
    }

    #[test]
    fn durable_row_shadows_outbox_copy_of_same_parcel() {
        // A parcel present in both loads hydrates from the durable row.
        let rows = vec![row("shared", RowSource::Parcel)];
        let parcels = vec![parcel("shared", Some(42.0))];
        let events = vec![outbox("shared")];

        let items = merge_details(&rows, &parcels, &events, false);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].delivery_price_rub, Some(42.0));
    }

    #[test]
    fn unpriced_parcel_survives_without_filter() {
        let rows = vec![row("a", RowSource::Parcel)];
        let parcels = vec![parcel("a", None)];

        let items = merge_details(&rows, &parcels, &[], false);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].delivery_price_rub, None);
    }
}
