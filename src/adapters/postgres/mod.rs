//! PostgreSQL adapters - pool construction, the Unit-of-Work, and the
//! transaction-scoped repositories.

mod combined_reader;
mod outbox_repository;
mod outbox_store;
mod parcel_repository;
mod parcel_type_repository;
mod pool;
mod unit_of_work;

pub use combined_reader::{CombinedParcelReader, CombinedRow, RowSource};
pub use outbox_repository::OutboxRepository;
pub use outbox_store::PgOutboxStore;
pub use parcel_repository::{NewParcel, ParcelRepository};
pub use parcel_type_repository::ParcelTypeRepository;
pub use pool::{connect_pool, connect_pool_with_isolation};
pub use unit_of_work::UnitOfWork;
