//! In-memory audit store.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::domain::ParcelError;
use crate::ports::{AuditStore, CalculationAudit, DeliveryTotal};

/// Audit store backed by a map keyed by parcel id.
#[derive(Default)]
pub struct InMemoryAuditStore {
    documents: RwLock<HashMap<String, CalculationAudit>>,
}

impl InMemoryAuditStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, parcel_id: &str) -> Option<CalculationAudit> {
        self.documents.read().await.get(parcel_id).cloned()
    }
}

#[async_trait]
impl AuditStore for InMemoryAuditStore {
    async fn upsert(&self, audit: &CalculationAudit) -> Result<(), ParcelError> {
        self.documents
            .write()
            .await
            .insert(audit.parcel_id.clone(), audit.clone());
        Ok(())
    }

    async fn summarize_by_type(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<DeliveryTotal>, ParcelError> {
        let documents = self.documents.read().await;
        let mut totals: HashMap<i32, f64> = HashMap::new();
        for audit in documents.values() {
            if audit.calculated_at >= start && audit.calculated_at < end {
                *totals.entry(audit.type_id).or_insert(0.0) += audit.calculated_price;
            }
        }

        let mut result: Vec<DeliveryTotal> = totals
            .into_iter()
            .map(|(type_id, total)| DeliveryTotal {
                type_id,
                total: (total * 100.0).round() / 100.0,
            })
            .collect();
        result.sort_by_key(|t| t.type_id);
        Ok(result)
    }
}
