//! Delivery calculation worker - consumes parcel events and materializes
//! priced parcel rows plus calculation audit documents.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::info;

use parcel_registry::adapters::events::{CurrencyService, WorkerContext, WorkerDispatcher};
use parcel_registry::adapters::mongo::MongoAuditStore;
use parcel_registry::adapters::postgres::connect_pool_with_isolation;
use parcel_registry::adapters::rabbitmq::RabbitConsumer;
use parcel_registry::adapters::redis::RedisCacheStore;
use parcel_registry::config::WorkerConfig;
use parcel_registry::ports::{AuditStore, CacheStore};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = WorkerConfig::load()?;
    config.validate()?;
    config.logging.init();

    let pool = connect_pool_with_isolation(&config.database).await?;
    let cache: Arc<dyn CacheStore> = Arc::new(RedisCacheStore::connect(&config.redis).await?);
    let audit: Arc<dyn AuditStore> = Arc::new(MongoAuditStore::connect(&config.mongo).await?);

    let ctx = Arc::new(WorkerContext {
        pool,
        audit,
        currency: CurrencyService::new(cache),
    });
    let dispatcher = Arc::new(WorkerDispatcher::new(ctx));
    let consumer = RabbitConsumer::new(config.rabbitmq.clone(), dispatcher);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        shutdown_signal().await;
        let _ = shutdown_tx.send(true);
    });

    consumer.run(shutdown_rx).await?;
    info!("delivery worker stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install SIGINT handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
    info!("shutdown signal received");
}
