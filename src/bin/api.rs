//! Registration API - accepts parcel requests and writes intent through the
//! transactional outbox.

use std::sync::Arc;

use axum::Router;
use metrics_exporter_prometheus::PrometheusBuilder;
use tower_http::trace::TraceLayer;
use tracing::info;

use parcel_registry::adapters::http::analytics::{analytics_routes, AnalyticsAppState};
use parcel_registry::adapters::http::debug::{debug_routes, DebugAppState};
use parcel_registry::adapters::http::monitoring::{monitoring_routes, MonitoringAppState};
use parcel_registry::adapters::http::parcels::{parcel_routes, ParcelAppState};
use parcel_registry::adapters::mongo::MongoAuditStore;
use parcel_registry::adapters::postgres::connect_pool_with_isolation;
use parcel_registry::adapters::redis::RedisCacheStore;
use parcel_registry::application::{
    BindCompanyHandler, DebugRecalculateHandler, DeliverySummaryHandler, GetParcelHandler,
    ListParcelTypesHandler, ListParcelsHandler, RegisterParcelHandler,
};
use parcel_registry::config::ApiConfig;
use parcel_registry::ports::{AuditStore, CacheStore};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = ApiConfig::load()?;
    config.validate()?;
    config.logging.init();

    let prometheus = PrometheusBuilder::new().install_recorder()?;

    let pool = connect_pool_with_isolation(&config.database).await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let redis = RedisCacheStore::connect(&config.redis).await?;
    let cache: Arc<dyn CacheStore> = Arc::new(redis.clone());
    let mongo = Arc::new(MongoAuditStore::connect(&config.mongo).await?);
    let audit: Arc<dyn AuditStore> = mongo.clone();

    let parcel_state = ParcelAppState {
        register: Arc::new(RegisterParcelHandler::new(pool.clone())),
        bind: Arc::new(BindCompanyHandler::new(pool.clone())),
        detail: Arc::new(GetParcelHandler::new(pool.clone())),
        list: Arc::new(ListParcelsHandler::new(pool.clone())),
        types: Arc::new(ListParcelTypesHandler::new(pool.clone())),
        cache,
    };
    let analytics_state = AnalyticsAppState {
        summary: Arc::new(DeliverySummaryHandler::new(audit)),
    };
    let debug_state = DebugAppState {
        recalculate: Arc::new(DebugRecalculateHandler::new(pool.clone())),
    };
    let monitoring_state = MonitoringAppState {
        pool,
        redis,
        mongo,
        prometheus,
    };

    let version = config.app.api_version.as_str();
    let app = Router::new()
        .nest(&format!("/{version}/parcels"), parcel_routes(parcel_state))
        .nest(
            &format!("/{version}/analytics"),
            analytics_routes(analytics_state),
        )
        .nest(&format!("/{version}/debug"), debug_routes(debug_state))
        .nest(
            &format!("/{version}/monitoring"),
            monitoring_routes(monitoring_state),
        )
        .layer(TraceLayer::new_for_http());

    let addr = config.app.socket_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, title = %config.meta.title_app, version = %config.meta.version_app, "registration API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("registration API stopped");
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
