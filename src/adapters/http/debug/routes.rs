//! Routes for debug endpoints.

use axum::routing::get;
use axum::Router;

use super::handlers::{trigger_recalculate, DebugAppState};

/// Builds the debug router, mounted under `/v1/debug`.
pub fn debug_routes(state: DebugAppState) -> Router {
    Router::new()
        .route("/recalculate", get(trigger_recalculate))
        .with_state(state)
}
