//! Parcel type dictionary use case.

use sqlx::PgPool;

use crate::adapters::postgres::UnitOfWork;
use crate::domain::{ParcelError, ParcelType};

/// Lists the static parcel-type dictionary.
pub struct ListParcelTypesHandler {
    pool: PgPool,
}

impl ListParcelTypesHandler {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn handle(&self) -> Result<Vec<ParcelType>, ParcelError> {
        let mut uow = UnitOfWork::begin(&self.pool).await?;
        let types = uow.parcel_types().list_all().await?;
        uow.commit().await?;
        Ok(types)
    }
}
