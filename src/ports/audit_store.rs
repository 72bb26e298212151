//! AuditStore port - calculation audit documents.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::ParcelError;

/// One calculation audit document, keyed by `parcel_id` in the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalculationAudit {
    pub parcel_id: String,
    pub type_id: i32,
    pub session_id: String,
    pub calculated_price: f64,
    pub calculated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recalculated_at: Option<DateTime<Utc>>,
}

/// Aggregated delivery cost for one parcel type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeliveryTotal {
    #[serde(rename = "type")]
    pub type_id: i32,
    pub total: f64,
}

/// Document store for delivery calculation audit records.
#[async_trait]
pub trait AuditStore: Send + Sync {
    /// Upserts the audit document for a parcel.
    async fn upsert(&self, audit: &CalculationAudit) -> Result<(), ParcelError>;

    /// Sums `calculated_price` per `type_id` over `[start, end)`, ordered by
    /// type id ascending.
    async fn summarize_by_type(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<DeliveryTotal>, ParcelError>;
}
