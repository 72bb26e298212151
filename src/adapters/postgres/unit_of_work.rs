//! Unit of Work over a single database transaction.

use sqlx::{PgPool, Postgres, Transaction};

use crate::domain::ParcelError;

use super::{CombinedParcelReader, OutboxRepository, ParcelRepository, ParcelTypeRepository};

/// Single-use transactional scope for one request.
///
/// All repository views borrow the same underlying transaction, so every
/// lookup inside the scope observes the same snapshot and uncommitted writes.
/// Business rows and the outbox row commit atomically, which is what makes
/// the outbox reliable.
///
/// The value is consumed by `commit` or `rollback`; dropping it without
/// either rolls the transaction back (sqlx transaction drop semantics), so an
/// error path that just propagates with `?` is safe.
pub struct UnitOfWork {
    tx: Transaction<'static, Postgres>,
}

impl UnitOfWork {
    /// Opens a new transaction on the pool.
    pub async fn begin(pool: &PgPool) -> Result<Self, ParcelError> {
        let tx = pool
            .begin()
            .await
            .map_err(|e| ParcelError::Database(format!("failed to begin transaction: {}", e)))?;
        Ok(Self { tx })
    }

    /// Parcel table access bound to this transaction.
    pub fn parcels(&mut self) -> ParcelRepository<'_> {
        ParcelRepository::new(&mut self.tx)
    }

    /// Outbox table access bound to this transaction.
    pub fn outbox(&mut self) -> OutboxRepository<'_> {
        OutboxRepository::new(&mut self.tx)
    }

    /// Parcel-type dictionary access bound to this transaction.
    pub fn parcel_types(&mut self) -> ParcelTypeRepository<'_> {
        ParcelTypeRepository::new(&mut self.tx)
    }

    /// Combined parcels + outbox read model bound to this transaction.
    pub fn combined(&mut self) -> CombinedParcelReader<'_> {
        CombinedParcelReader::new(&mut self.tx)
    }

    pub async fn commit(self) -> Result<(), ParcelError> {
        self.tx
            .commit()
            .await
            .map_err(|e| ParcelError::Database(format!("commit failed: {}", e)))
    }

    pub async fn rollback(self) -> Result<(), ParcelError> {
        self.tx
            .rollback()
            .await
            .map_err(|e| ParcelError::Database(format!("rollback failed: {}", e)))
    }
}
