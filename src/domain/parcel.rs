//! Parcel entities and reference data.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};
use sqlx::FromRow;

/// A registered parcel.
///
/// Rows are inserted and priced by the delivery worker only; the API reads
/// them and sets `company_id` on the bind path. `company_id` transitions
/// null to non-null exactly once, and `delivery_price_rub` is never reset to
/// null once calculated.
#[derive(Debug, Clone, FromRow)]
pub struct Parcel {
    pub id: String,
    pub session_id: String,
    pub name: String,
    pub weight_kg: f64,
    pub type_id: i32,
    pub cost_adjustment_usd: f64,
    pub delivery_price_rub: Option<f64>,
    pub company_id: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Parcel type dictionary entry. Static reference data.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ParcelType {
    pub id: i32,
    pub name: String,
}

/// Transport company reference data.
#[derive(Debug, Clone, FromRow)]
pub struct Company {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Presentation value for a parcel's delivery price.
///
/// Wire compatibility: a calculated price is emitted as a JSON number, a
/// missing one as the literal string "Не рассчитано".
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DeliveryPrice {
    Calculated(f64),
    NotCalculated,
}

impl DeliveryPrice {
    pub const NOT_CALCULATED: &'static str = "Не рассчитано";

    pub fn from_option(value: Option<f64>) -> Self {
        match value {
            Some(v) => DeliveryPrice::Calculated(v),
            None => DeliveryPrice::NotCalculated,
        }
    }

    pub fn as_option(&self) -> Option<f64> {
        match self {
            DeliveryPrice::Calculated(v) => Some(*v),
            DeliveryPrice::NotCalculated => None,
        }
    }
}

impl Default for DeliveryPrice {
    fn default() -> Self {
        DeliveryPrice::NotCalculated
    }
}

impl Serialize for DeliveryPrice {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            DeliveryPrice::Calculated(v) => serializer.serialize_f64(*v),
            DeliveryPrice::NotCalculated => serializer.serialize_str(Self::NOT_CALCULATED),
        }
    }
}

// Cached responses round-trip through JSON: a number is a calculated price,
// any string is the not-calculated marker.
impl<'de> Deserialize<'de> for DeliveryPrice {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        Ok(match value.as_f64() {
            Some(v) => DeliveryPrice::Calculated(v),
            None => DeliveryPrice::NotCalculated,
        })
    }
}
