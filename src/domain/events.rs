//! Outbox events and the broker wire format.
//!
//! The event-type set is closed: the publisher routes by it and the worker
//! dispatches on it, so it is modeled as an enum rather than free-form
//! strings. `BrokerMessage` is the exact JSON body that crosses the broker:
//! `{"payload": <object|null>, "event_type": "<key>"}`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use super::error::ParcelError;

/// Closed set of outbox event types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    /// A parcel was registered; payload carries the parcel fields.
    ParcelRegistered,
    /// Recalculate delivery prices for all unpriced parcels; no payload.
    ParcelRecalculate,
}

impl EventType {
    /// Wire identifier, also used as the broker routing key.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::ParcelRegistered => "parcel.registered",
            EventType::ParcelRecalculate => "parcel.recalculate",
        }
    }

    /// Parses a wire identifier; unknown values are rejected so consumers can
    /// drop them explicitly.
    pub fn parse(s: &str) -> Option<EventType> {
        match s {
            "parcel.registered" => Some(EventType::ParcelRegistered),
            "parcel.recalculate" => Some(EventType::ParcelRecalculate),
            _ => None,
        }
    }

    /// All routing keys the worker queue is bound to.
    pub fn all() -> [EventType; 2] {
        [EventType::ParcelRegistered, EventType::ParcelRecalculate]
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payload of a `parcel.registered` event.
///
/// These are the fields the worker needs to materialize the durable parcel
/// row; the combined read model also projects them straight out of the JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisteredParcelPayload {
    pub parcel_id: String,
    pub session_id: String,
    pub name: String,
    pub weight_kg: f64,
    pub type_id: i32,
    pub cost_adjustment_usd: f64,
}

impl RegisteredParcelPayload {
    pub fn to_json(&self) -> Result<JsonValue, ParcelError> {
        serde_json::to_value(self)
            .map_err(|e| ParcelError::validation("payload", format!("not serializable: {}", e)))
    }
}

/// A row of the `outbox_events` table.
///
/// Rows are owned by the transaction that created them until the publisher
/// marks them applied; after that they are immutable history.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OutboxEvent {
    pub id: String,
    pub parcel_id: Option<String>,
    pub session_id: Option<String>,
    pub event_type: String,
    pub payload: Option<JsonValue>,
    pub applied: bool,
    pub created_at: DateTime<Utc>,
    pub published_at: Option<DateTime<Utc>>,
}

impl OutboxEvent {
    /// Builds a `parcel.registered` event for a freshly registered parcel.
    pub fn registered(payload: &RegisteredParcelPayload) -> Result<Self, ParcelError> {
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            parcel_id: Some(payload.parcel_id.clone()),
            session_id: Some(payload.session_id.clone()),
            event_type: EventType::ParcelRegistered.as_str().to_string(),
            payload: Some(payload.to_json()?),
            applied: false,
            created_at: Utc::now(),
            published_at: None,
        })
    }

    /// Builds a `parcel.recalculate` control event (no payload).
    pub fn recalculate() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            parcel_id: None,
            session_id: None,
            event_type: EventType::ParcelRecalculate.as_str().to_string(),
            payload: None,
            applied: false,
            created_at: Utc::now(),
            published_at: None,
        }
    }

    /// The broker message for this row.
    pub fn to_message(&self) -> BrokerMessage {
        BrokerMessage {
            payload: self.payload.clone(),
            event_type: self.event_type.clone(),
        }
    }
}

/// The JSON body published to the exchange and consumed by the worker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrokerMessage {
    pub payload: Option<JsonValue>,
    pub event_type: String,
}

impl BrokerMessage {
    pub fn to_bytes(&self) -> Result<Vec<u8>, ParcelError> {
        serde_json::to_vec(self).map_err(|e| ParcelError::Broker(format!("encode failed: {}", e)))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ParcelError> {
        serde_json::from_slice(bytes)
            .map_err(|e| ParcelError::Broker(format!("decode failed: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn event_type_round_trips_through_wire_ids() {
        for et in EventType::all() {
            assert_eq!(EventType::parse(et.as_str()), Some(et));
        }
        assert_eq!(EventType::parse("parcel.unknown"), None);
    }

    #[test]
    fn broker_message_serializes_to_expected_shape() {
        let msg = BrokerMessage {
            payload: Some(json!({"parcel_id": "abc"})),
            event_type: "parcel.registered".to_string(),
        };
        let value: JsonValue = serde_json::from_slice(&msg.to_bytes().unwrap()).unwrap();
        assert_eq!(
            value,
            json!({"payload": {"parcel_id": "abc"}, "event_type": "parcel.registered"})
        );
    }

    #[test]
    fn control_message_carries_null_payload() {
        let msg = OutboxEvent::recalculate().to_message();
        let value: JsonValue = serde_json::from_slice(&msg.to_bytes().unwrap()).unwrap();
        assert_eq!(value["payload"], JsonValue::Null);
        assert_eq!(value["event_type"], "parcel.recalculate");
    }

    #[test]
    fn registered_event_embeds_payload_fields() {
        let payload = RegisteredParcelPayload {
            parcel_id: "p-1".to_string(),
            session_id: "s-1".to_string(),
            name: "Box".to_string(),
            weight_kg: 2.0,
            type_id: 1,
            cost_adjustment_usd: 10.0,
        };
        let event = OutboxEvent::registered(&payload).unwrap();

        assert_eq!(event.event_type, "parcel.registered");
        assert_eq!(event.parcel_id.as_deref(), Some("p-1"));
        assert_eq!(event.session_id.as_deref(), Some("s-1"));
        assert!(!event.applied);
        assert!(event.published_at.is_none());

        let body = event.payload.unwrap();
        assert_eq!(body["weight_kg"], 2.0);
        assert_eq!(body["type_id"], 1);
    }

    #[test]
    fn broker_message_decode_rejects_garbage() {
        assert!(BrokerMessage::from_bytes(b"not json").is_err());
    }
}
