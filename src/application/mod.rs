//! Application layer - one handler per use case, constructed at startup with
//! their dependencies and invoked by the HTTP adapters.

mod bind_company;
mod debug_recalculate;
mod delivery_summary;
mod get_parcel;
mod list_parcel_types;
mod list_parcels;
mod register_parcel;

pub use bind_company::BindCompanyHandler;
pub use debug_recalculate::DebugRecalculateHandler;
pub use delivery_summary::{DeliverySummary, DeliverySummaryHandler};
pub use get_parcel::{GetParcelHandler, ParcelDetail};
pub use list_parcel_types::ListParcelTypesHandler;
pub use list_parcels::{ListParcelsHandler, ListParcelsQuery, ParcelList};
pub use register_parcel::{RegisterParcelCommand, RegisterParcelHandler, RegisterParcelResult};
