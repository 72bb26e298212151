//! Routes for monitoring endpoints.

use axum::routing::get;
use axum::Router;

use super::handlers::{health, live, metrics, ready, MonitoringAppState};

/// Builds the monitoring router, mounted under `/v1/monitoring`.
pub fn monitoring_routes(state: MonitoringAppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/live", get(live))
        .route("/ready", get(ready))
        .route("/metrics", get(metrics))
        .with_state(state)
}
