//! Adapters - infrastructure implementations of the ports plus the
//! process runtimes (publisher loop, worker dispatcher, HTTP surface).

pub mod events;
pub mod http;
pub mod memory;
pub mod mongo;
pub mod postgres;
pub mod rabbitmq;
pub mod redis;
