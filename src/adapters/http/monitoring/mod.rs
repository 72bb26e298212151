//! Monitoring endpoints: health, liveness, readiness, metrics.

mod handlers;
mod routes;

pub use handlers::MonitoringAppState;
pub use routes::monitoring_routes;
