//! Routes for parcel endpoints.

use axum::routing::{get, post};
use axum::Router;

use super::handlers::{
    bind_company, create_parcel, get_all_parcels, get_parcel_detail, get_parcel_types,
    ParcelAppState,
};

/// Builds the parcel router, mounted under `/v1/parcels`.
pub fn parcel_routes(state: ParcelAppState) -> Router {
    Router::new()
        .route("/", post(create_parcel))
        .route("/all", get(get_all_parcels))
        .route("/parcels-types/", get(get_parcel_types))
        .route("/:parcel_id", get(get_parcel_detail))
        .route("/:parcel_id/bind-company", post(bind_company))
        .with_state(state)
}
