//! Analytics endpoints.

mod handlers;
mod routes;

pub use handlers::{AnalyticsAppState, AnalyticsResponse, DeliverySummaryParams};
pub use routes::analytics_routes;
