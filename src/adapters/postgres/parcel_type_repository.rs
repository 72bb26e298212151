//! Parcel type dictionary access.

use sqlx::postgres::PgConnection;
use sqlx::{Postgres, Transaction};

use crate::domain::{ParcelError, ParcelType};

/// Transaction-scoped repository for the `parcel_types` dictionary.
pub struct ParcelTypeRepository<'t> {
    conn: &'t mut PgConnection,
}

impl<'t> ParcelTypeRepository<'t> {
    pub(super) fn new(tx: &'t mut Transaction<'static, Postgres>) -> Self {
        Self { conn: &mut *tx }
    }

    pub async fn list_all(&mut self) -> Result<Vec<ParcelType>, ParcelError> {
        let types =
            sqlx::query_as::<_, ParcelType>("SELECT id, name FROM parcel_types ORDER BY id")
                .fetch_all(&mut *self.conn)
                .await
                .map_err(|e| {
                    ParcelError::Database(format!("failed to list parcel types: {}", e))
                })?;

        Ok(types)
    }
}
