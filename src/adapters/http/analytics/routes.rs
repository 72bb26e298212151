//! Routes for analytics endpoints.

use axum::routing::get;
use axum::Router;

use super::handlers::{get_delivery_summary, AnalyticsAppState};

/// Builds the analytics router, mounted under `/v1/analytics`.
pub fn analytics_routes(state: AnalyticsAppState) -> Router {
    Router::new()
        .route("/delivery/summary", get(get_delivery_summary))
        .with_state(state)
}
