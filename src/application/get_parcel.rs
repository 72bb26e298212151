//! Parcel detail use case.

use serde_json::Value as JsonValue;
use sqlx::PgPool;
use tracing::{debug, warn};

use crate::adapters::postgres::UnitOfWork;
use crate::domain::{OutboxEvent, Parcel, ParcelError};

/// Uniform detail view over both projections of a parcel.
#[derive(Debug, Clone, PartialEq)]
pub struct ParcelDetail {
    pub parcel_id: String,
    pub name: String,
    pub weight_kg: f64,
    pub type_id: i32,
    pub cost_adjustment_usd: f64,
    pub delivery_price_rub: Option<f64>,
}

impl ParcelDetail {
    pub fn from_parcel(parcel: &Parcel) -> Self {
        Self {
            parcel_id: parcel.id.clone(),
            name: parcel.name.clone(),
            weight_kg: parcel.weight_kg,
            type_id: parcel.type_id,
            cost_adjustment_usd: parcel.cost_adjustment_usd,
            delivery_price_rub: parcel.delivery_price_rub,
        }
    }

    /// Builds a detail view from a registration event's JSON payload.
    /// Returns None when the payload is missing required fields.
    pub fn from_outbox_payload(payload: &JsonValue) -> Option<Self> {
        Some(Self {
            parcel_id: payload.get("parcel_id")?.as_str()?.to_string(),
            name: payload.get("name")?.as_str()?.to_string(),
            weight_kg: payload.get("weight_kg")?.as_f64()?,
            type_id: payload.get("type_id")?.as_i64()? as i32,
            cost_adjustment_usd: payload.get("cost_adjustment_usd")?.as_f64()?,
            delivery_price_rub: payload
                .get("delivery_price_rub")
                .and_then(JsonValue::as_f64),
        })
    }

    pub fn from_outbox_event(event: &OutboxEvent) -> Option<Self> {
        event.payload.as_ref().and_then(Self::from_outbox_payload)
    }
}

/// Looks a parcel up by id: the durable table first, the outbox second.
///
/// The outbox path enforces session ownership; a session-id mismatch is
/// `AccessDenied`.
pub struct GetParcelHandler {
    pool: PgPool,
}

impl GetParcelHandler {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn handle(
        &self,
        parcel_id: &str,
        session_id: &str,
    ) -> Result<ParcelDetail, ParcelError> {
        let mut uow = UnitOfWork::begin(&self.pool).await?;

        if let Some(parcel) = uow.parcels().find_by_id(parcel_id).await? {
            debug!(parcel_id, "parcel found in durable table");
            uow.commit().await?;
            return Ok(ParcelDetail::from_parcel(&parcel));
        }

        debug!(parcel_id, "parcel not in durable table, checking outbox");
        let event = uow.outbox().find_by_parcel_id(parcel_id).await?;
        uow.commit().await?;

        let event = event.ok_or(ParcelError::ParcelNotFound)?;

        if event.session_id.as_deref() != Some(session_id) {
            warn!(parcel_id, session_id, "session mismatch on outbox parcel");
            return Err(ParcelError::AccessDenied);
        }

        ParcelDetail::from_outbox_event(&event).ok_or(ParcelError::ParcelNotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn detail_from_payload_reads_all_fields() {
        let payload = json!({
            "parcel_id": "p-1",
            "session_id": "s-1",
            "name": "Box",
            "weight_kg": 2.0,
            "type_id": 1,
            "cost_adjustment_usd": 10.0
        });
        let detail = ParcelDetail::from_outbox_payload(&payload).unwrap();
        assert_eq!(detail.parcel_id, "p-1");
        assert_eq!(detail.weight_kg, 2.0);
        assert_eq!(detail.delivery_price_rub, None);
    }

    #[test]
    fn detail_from_payload_rejects_missing_fields() {
        let payload = json!({"parcel_id": "p-1"});
        assert!(ParcelDetail::from_outbox_payload(&payload).is_none());
    }
}
