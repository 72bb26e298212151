//! Event pipeline runtimes - the outbox publisher loop and the worker's
//! dispatch + strategies, plus the cached currency lookup they share.

mod currency;
mod dispatcher;
mod outbox_publisher;
mod strategies;

pub use currency::{parse_usd_rate, CurrencyService};
pub use dispatcher::{WorkerContext, WorkerDispatcher};
pub use outbox_publisher::{BatchOutcome, OutboxPublisher, OutboxPublisherConfig};
