//! Register-parcel use case.

use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::adapters::postgres::UnitOfWork;
use crate::domain::{OutboxEvent, ParcelError, RegisteredParcelPayload};

/// Input for parcel registration, already validated by the HTTP layer.
#[derive(Debug, Clone)]
pub struct RegisterParcelCommand {
    pub session_id: String,
    pub name: String,
    pub weight_kg: f64,
    pub type_id: i32,
    pub cost_adjustment_usd: f64,
}

/// Result of a successful registration.
#[derive(Debug, Clone)]
pub struct RegisterParcelResult {
    pub parcel_id: String,
    /// The event payload, returned so the HTTP layer can prime the cache.
    pub payload: RegisteredParcelPayload,
}

/// Writes parcel intent as a `parcel.registered` outbox event.
///
/// The durable parcel row is created later by the worker; registration only
/// persists the event, atomically, under the Unit of Work. A duplicate
/// outbox id is idempotent success.
pub struct RegisterParcelHandler {
    pool: PgPool,
}

impl RegisterParcelHandler {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn handle(
        &self,
        cmd: RegisterParcelCommand,
    ) -> Result<RegisterParcelResult, ParcelError> {
        let payload = RegisteredParcelPayload {
            parcel_id: Uuid::new_v4().to_string(),
            session_id: cmd.session_id,
            name: cmd.name,
            weight_kg: cmd.weight_kg,
            type_id: cmd.type_id,
            cost_adjustment_usd: cmd.cost_adjustment_usd,
        };
        let event = OutboxEvent::registered(&payload)?;

        info!(parcel_id = %payload.parcel_id, session_id = %payload.session_id, "registering parcel");

        let mut uow = UnitOfWork::begin(&self.pool).await?;
        match uow.outbox().add(&event).await {
            Ok(()) => {
                uow.commit().await?;
                info!(parcel_id = %payload.parcel_id, "outbox event added");
            }
            Err(ParcelError::OutboxDuplicate) => {
                warn!(parcel_id = %payload.parcel_id, "outbox event already exists");
                uow.rollback().await?;
            }
            Err(e) => return Err(e),
        }

        Ok(RegisterParcelResult {
            parcel_id: payload.parcel_id.clone(),
            payload,
        })
    }
}
