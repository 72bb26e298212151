//! Parcel Registry - parcel registration platform.
//!
//! Three processes share this crate: the registration API, the outbox
//! publisher, and the delivery calculation worker. Parcel writes go through
//! the transactional outbox; reads merge the durable `parcels` table with
//! still-pending outbox events.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
