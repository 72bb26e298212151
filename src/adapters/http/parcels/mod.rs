//! Parcel endpoints.

mod dto;
mod handlers;
mod routes;

pub use dto::{
    BindCompanyRequest, BindCompanyResponse, ListParcelsParams, ParcelCreateRequest,
    ParcelCreatedResponse, ParcelDetailResponse, ParcelListResponse,
};
pub use handlers::ParcelAppState;
pub use routes::parcel_routes;
