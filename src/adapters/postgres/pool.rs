//! Connection pool construction.

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::config::DatabaseSettings;
use crate::domain::ParcelError;

/// Builds a pool with the engine-default transaction isolation
/// (READ COMMITTED). Used by the outbox publisher, whose skip-locked claim
/// does not need a repeatable-read snapshot.
pub async fn connect_pool(settings: &DatabaseSettings) -> Result<PgPool, ParcelError> {
    PgPoolOptions::new()
        .max_connections(settings.pool_size)
        .acquire_timeout(settings.pool_timeout())
        .connect(&settings.url())
        .await
        .map_err(|e| ParcelError::Database(format!("failed to connect: {}", e)))
}

/// Builds a pool that pins the configured default transaction isolation on
/// every connection. The API and worker run REPEATABLE READ so each
/// transaction reads a consistent snapshot.
pub async fn connect_pool_with_isolation(
    settings: &DatabaseSettings,
) -> Result<PgPool, ParcelError> {
    let isolation = settings.isolation_level.to_lowercase();
    PgPoolOptions::new()
        .max_connections(settings.pool_size)
        .acquire_timeout(settings.pool_timeout())
        .after_connect(move |conn, _meta| {
            let stmt = format!(
                "SET SESSION CHARACTERISTICS AS TRANSACTION ISOLATION LEVEL {}",
                isolation
            );
            Box::pin(async move {
                sqlx::query(&stmt).execute(conn).await?;
                Ok(())
            })
        })
        .connect(&settings.url())
        .await
        .map_err(|e| ParcelError::Database(format!("failed to connect: {}", e)))
}
