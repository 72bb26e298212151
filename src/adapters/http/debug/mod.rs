//! Debug endpoints.

mod handlers;
mod routes;

pub use handlers::DebugAppState;
pub use routes::debug_routes;
