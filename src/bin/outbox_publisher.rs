//! Outbox publisher - drains unpublished outbox rows into the broker.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::info;

use parcel_registry::adapters::events::{OutboxPublisher, OutboxPublisherConfig};
use parcel_registry::adapters::postgres::{connect_pool, PgOutboxStore};
use parcel_registry::adapters::rabbitmq::RabbitEventPublisher;
use parcel_registry::config::PublisherConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = PublisherConfig::load()?;
    config.validate()?;
    config.logging.init();

    let pool = connect_pool(&config.database).await?;
    let store = Arc::new(PgOutboxStore::new(pool));
    let broker = Arc::new(RabbitEventPublisher::new(config.rabbitmq.clone()));

    let publisher = OutboxPublisher::with_config(
        store,
        broker,
        OutboxPublisherConfig {
            batch_size: config.publisher.batch_size,
            sleep_interval: config.publisher.sleep(),
        },
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        shutdown_signal().await;
        let _ = shutdown_tx.send(true);
    });

    publisher.run(shutdown_rx).await;
    info!("outbox publisher stopped");
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
