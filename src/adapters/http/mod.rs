//! HTTP adapters - REST API surface of the registration service.
//!
//! Each resource has its own router/handlers/dto triple; error mapping is
//! shared in `error`.

pub mod analytics;
pub mod debug;
pub mod error;
pub mod monitoring;
pub mod parcels;
mod session;

pub use error::{handle_parcel_error, ErrorResponse};
pub use session::require_session_id;
