//! Parcel table access.

use sqlx::postgres::PgConnection;
use sqlx::{Postgres, Transaction};

use crate::domain::{Parcel, ParcelError};

/// Fields for a parcel row inserted by the delivery worker.
#[derive(Debug, Clone)]
pub struct NewParcel {
    pub id: String,
    pub session_id: String,
    pub name: String,
    pub weight_kg: f64,
    pub type_id: i32,
    pub cost_adjustment_usd: f64,
    pub delivery_price_rub: Option<f64>,
}

/// Transaction-scoped repository for the `parcels` table.
pub struct ParcelRepository<'t> {
    conn: &'t mut PgConnection,
}

impl<'t> ParcelRepository<'t> {
    pub(super) fn new(tx: &'t mut Transaction<'static, Postgres>) -> Self {
        Self { conn: &mut *tx }
    }

    pub async fn find_by_id(&mut self, parcel_id: &str) -> Result<Option<Parcel>, ParcelError> {
        let parcel = sqlx::query_as::<_, Parcel>(
            r#"
            SELECT id, session_id, name, weight_kg, type_id, cost_adjustment_usd,
                   delivery_price_rub, company_id, created_at, updated_at
            FROM parcels
            WHERE id = $1
            "#,
        )
        .bind(parcel_id)
        .fetch_optional(&mut *self.conn)
        .await
        .map_err(|e| ParcelError::Database(format!("failed to fetch parcel: {}", e)))?;

        Ok(parcel)
    }

    /// Inserts a new parcel row. A duplicate id or `(name, session_id)` pair
    /// surfaces as `ParcelAlreadyExists`.
    pub async fn insert(&mut self, parcel: &NewParcel) -> Result<(), ParcelError> {
        sqlx::query(
            r#"
            INSERT INTO parcels (
                id, session_id, name, weight_kg, type_id,
                cost_adjustment_usd, delivery_price_rub
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(&parcel.id)
        .bind(&parcel.session_id)
        .bind(&parcel.name)
        .bind(parcel.weight_kg)
        .bind(parcel.type_id)
        .bind(parcel.cost_adjustment_usd)
        .bind(parcel.delivery_price_rub)
        .execute(&mut *self.conn)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                ParcelError::ParcelAlreadyExists
            }
            _ => ParcelError::Database(format!("failed to insert parcel: {}", e)),
        })?;

        Ok(())
    }

    /// Binds a company to a parcel if no company is bound yet.
    ///
    /// The parcel row is locked with `FOR UPDATE` so two concurrent binds
    /// serialize; the loser observes the winner's `company_id` and gets
    /// `AlreadyBound`.
    pub async fn bind_company_if_unset(
        &mut self,
        parcel_id: &str,
        company_id: i32,
    ) -> Result<(), ParcelError> {
        let company: Option<(i32,)> = sqlx::query_as("SELECT id FROM companies WHERE id = $1")
            .bind(company_id)
            .fetch_optional(&mut *self.conn)
            .await
            .map_err(|e| ParcelError::Database(format!("failed to check company: {}", e)))?;

        if company.is_none() {
            return Err(ParcelError::CompanyNotFound);
        }

        let current: Option<(Option<i32>,)> =
            sqlx::query_as("SELECT company_id FROM parcels WHERE id = $1 FOR UPDATE")
                .bind(parcel_id)
                .fetch_optional(&mut *self.conn)
                .await
                .map_err(|e| ParcelError::Database(format!("failed to lock parcel: {}", e)))?;

        match current {
            None => Err(ParcelError::ParcelNotFound),
            Some((Some(_),)) => Err(ParcelError::AlreadyBound),
            Some((None,)) => {
                sqlx::query(
                    "UPDATE parcels SET company_id = $2, updated_at = NOW() WHERE id = $1",
                )
                .bind(parcel_id)
                .bind(company_id)
                .execute(&mut *self.conn)
                .await
                .map_err(|e| ParcelError::Database(format!("failed to bind company: {}", e)))?;
                Ok(())
            }
        }
    }

    /// All parcels whose delivery price has not been calculated yet.
    pub async fn list_unpriced(&mut self) -> Result<Vec<Parcel>, ParcelError> {
        let parcels = sqlx::query_as::<_, Parcel>(
            r#"
            SELECT id, session_id, name, weight_kg, type_id, cost_adjustment_usd,
                   delivery_price_rub, company_id, created_at, updated_at
            FROM parcels
            WHERE delivery_price_rub IS NULL
            ORDER BY created_at
            "#,
        )
        .fetch_all(&mut *self.conn)
        .await
        .map_err(|e| ParcelError::Database(format!("failed to list unpriced parcels: {}", e)))?;

        Ok(parcels)
    }

    /// Fills in a delivery price for a previously unpriced parcel. The
    /// `IS NULL` guard keeps already-calculated prices untouched.
    pub async fn set_delivery_price(
        &mut self,
        parcel_id: &str,
        price: f64,
    ) -> Result<bool, ParcelError> {
        let result = sqlx::query(
            r#"
            UPDATE parcels
            SET delivery_price_rub = $2, updated_at = NOW()
            WHERE id = $1 AND delivery_price_rub IS NULL
            "#,
        )
        .bind(parcel_id)
        .bind(price)
        .execute(&mut *self.conn)
        .await
        .map_err(|e| ParcelError::Database(format!("failed to set delivery price: {}", e)))?;

        Ok(result.rows_affected() > 0)
    }
}
