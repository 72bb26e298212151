//! RabbitMQ adapters - publishing with confirms, the consumer runtime, and
//! topology initialization.

mod consumer;
mod publisher;
mod topology;

pub use consumer::{DispatchOutcome, MessageDispatcher, RabbitConsumer};
pub use publisher::RabbitEventPublisher;
pub use topology::{declare_topology, wait_for_broker};
