//! Broker topology initializer - declares the exchange, queue, and bindings.
//!
//! Runs once before the publisher and worker start; they attach to the
//! topology this binary owns and never declare it themselves.

use std::time::Duration;

use tracing::error;

use parcel_registry::adapters::rabbitmq::{declare_topology, wait_for_broker};
use parcel_registry::config::TopologyConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = TopologyConfig::load()?;
    config.validate()?;
    config.logging.init();

    if let Err(e) = run(&config).await {
        error!(error = %e, "RabbitMQ initialization failed");
        std::process::exit(1);
    }
    Ok(())
}

async fn run(config: &TopologyConfig) -> Result<(), Box<dyn std::error::Error>> {
    wait_for_broker(&config.rabbitmq.url, 10, Duration::from_secs(3)).await?;
    declare_topology(&config.rabbitmq).await?;
    Ok(())
}
