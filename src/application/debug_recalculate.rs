//! Debug recalculate trigger.

use sqlx::PgPool;
use tracing::{info, warn};

use crate::adapters::postgres::UnitOfWork;
use crate::domain::{OutboxEvent, ParcelError};

/// Queues a `parcel.recalculate` control event through the outbox.
pub struct DebugRecalculateHandler {
    pool: PgPool,
}

impl DebugRecalculateHandler {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn handle(&self) -> Result<String, ParcelError> {
        let event = OutboxEvent::recalculate();
        let event_id = event.id.clone();

        let mut uow = UnitOfWork::begin(&self.pool).await?;
        match uow.outbox().add(&event).await {
            Ok(()) => {
                uow.commit().await?;
                info!(event_id = %event_id, "recalculate event queued");
            }
            Err(ParcelError::OutboxDuplicate) => {
                warn!(event_id = %event_id, "recalculate event already queued");
                uow.rollback().await?;
            }
            Err(e) => return Err(e),
        }

        Ok(event_id)
    }
}
