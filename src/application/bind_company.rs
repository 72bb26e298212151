//! Bind-company use case.

use sqlx::PgPool;
use tracing::{info, warn};

use crate::adapters::postgres::UnitOfWork;
use crate::domain::ParcelError;

/// Binds a transport company to a parcel.
///
/// The repository locks the parcel row for the duration of the transaction,
/// so two concurrent binds serialize: one commits, the other sees
/// `AlreadyBound`. An existing binding is never overwritten.
pub struct BindCompanyHandler {
    pool: PgPool,
}

impl BindCompanyHandler {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn handle(&self, parcel_id: &str, company_id: i32) -> Result<(), ParcelError> {
        info!(parcel_id, company_id, "binding company to parcel");

        let mut uow = UnitOfWork::begin(&self.pool).await?;
        match uow.parcels().bind_company_if_unset(parcel_id, company_id).await {
            Ok(()) => {
                uow.commit().await?;
                info!(parcel_id, company_id, "company bound");
                Ok(())
            }
            Err(e) => {
                warn!(parcel_id, company_id, error = %e, "bind failed");
                uow.rollback().await?;
                Err(e)
            }
        }
    }
}
