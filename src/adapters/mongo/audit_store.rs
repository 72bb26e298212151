//! MongoDB calculation audit store.

use async_trait::async_trait;
use bson::{doc, Bson, Document};
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use mongodb::{Client, Collection, Database};

use crate::config::MongoSettings;
use crate::domain::ParcelError;
use crate::ports::{AuditStore, CalculationAudit, DeliveryTotal};

/// Audit documents live in one collection, keyed by `parcel_id`; each
/// calculation or recalculation upserts the parcel's document.
pub struct MongoAuditStore {
    db: Database,
    collection: Collection<Document>,
}

impl MongoAuditStore {
    pub async fn connect(settings: &MongoSettings) -> Result<Self, ParcelError> {
        let client = Client::with_uri_str(&settings.uri)
            .await
            .map_err(|e| ParcelError::DocumentStore(format!("failed to connect: {}", e)))?;
        let db = client.database(&settings.db_name);
        let collection = db.collection::<Document>(&settings.collection_name);
        Ok(Self { db, collection })
    }

    /// Round-trip health probe.
    pub async fn ping(&self) -> Result<(), ParcelError> {
        self.db
            .run_command(doc! {"ping": 1})
            .await
            .map_err(|e| ParcelError::DocumentStore(format!("ping failed: {}", e)))?;
        Ok(())
    }

    fn to_document(audit: &CalculationAudit) -> Document {
        let mut set = doc! {
            "parcel_id": audit.parcel_id.as_str(),
            "type_id": audit.type_id,
            "session_id": audit.session_id.as_str(),
            "calculated_price": audit.calculated_price,
            "calculated_at": bson::DateTime::from_chrono(audit.calculated_at),
        };
        if let Some(recalculated_at) = audit.recalculated_at {
            set.insert(
                "recalculated_at",
                bson::DateTime::from_chrono(recalculated_at),
            );
        }
        set
    }
}

#[async_trait]
impl AuditStore for MongoAuditStore {
    async fn upsert(&self, audit: &CalculationAudit) -> Result<(), ParcelError> {
        self.collection
            .update_one(
                doc! {"parcel_id": audit.parcel_id.as_str()},
                doc! {"$set": Self::to_document(audit)},
            )
            .upsert(true)
            .await
            .map_err(|e| ParcelError::DocumentStore(format!("upsert failed: {}", e)))?;
        Ok(())
    }

    async fn summarize_by_type(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<DeliveryTotal>, ParcelError> {
        let pipeline = vec![
            doc! {"$match": {
                "calculated_at": {
                    "$gte": bson::DateTime::from_chrono(start),
                    "$lt": bson::DateTime::from_chrono(end),
                }
            }},
            doc! {"$group": {
                "_id": "$type_id",
                "total": {"$sum": "$calculated_price"},
            }},
            doc! {"$sort": {"_id": 1}},
        ];

        let mut cursor = self
            .collection
            .aggregate(pipeline)
            .await
            .map_err(|e| ParcelError::DocumentStore(format!("aggregation failed: {}", e)))?;

        let mut totals = Vec::new();
        while let Some(doc) = cursor
            .try_next()
            .await
            .map_err(|e| ParcelError::DocumentStore(format!("cursor failed: {}", e)))?
        {
            let type_id = match doc.get("_id") {
                Some(Bson::Int32(v)) => *v,
                Some(Bson::Int64(v)) => *v as i32,
                _ => continue,
            };
            let total = match doc.get("total") {
                Some(Bson::Double(v)) => *v,
                Some(Bson::Int32(v)) => *v as f64,
                Some(Bson::Int64(v)) => *v as f64,
                _ => continue,
            };
            totals.push(DeliveryTotal {
                type_id,
                total: (total * 100.0).round() / 100.0,
            });
        }

        Ok(totals)
    }
}
