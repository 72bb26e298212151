//! Delivery cost summary over the calculation audit documents.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};

use crate::domain::ParcelError;
use crate::ports::{AuditStore, DeliveryTotal};

/// Per-type delivery totals for one UTC day.
#[derive(Debug, Clone)]
pub struct DeliverySummary {
    pub date: DateTime<Utc>,
    pub items: Vec<DeliveryTotal>,
}

/// Aggregates audit documents per parcel type for a single day.
///
/// Only calculated parcels ever reach the audit store, so null prices never
/// enter the aggregation.
pub struct DeliverySummaryHandler {
    audit: Arc<dyn AuditStore>,
}

impl DeliverySummaryHandler {
    pub fn new(audit: Arc<dyn AuditStore>) -> Self {
        Self { audit }
    }

    pub async fn handle(&self, date: Option<NaiveDate>) -> Result<DeliverySummary, ParcelError> {
        let day = date.unwrap_or_else(|| Utc::now().date_naive());
        let start = Utc.from_utc_datetime(&day.and_hms_opt(0, 0, 0).expect("midnight is valid"));
        let end = start + chrono::Duration::days(1);

        let items = self.audit.summarize_by_type(start, end).await?;
        Ok(DeliverySummary { date: start, items })
    }
}
