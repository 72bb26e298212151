//! Domain layer - entities, events, pricing, and error types.

pub mod error;
pub mod events;
pub mod parcel;
pub mod pricing;

pub use error::ParcelError;
pub use events::{BrokerMessage, EventType, OutboxEvent, RegisteredParcelPayload};
pub use parcel::{Company, DeliveryPrice, Parcel, ParcelType};
pub use pricing::delivery_price;
