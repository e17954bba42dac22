//! Queue core: state, drain loop and slot drivers.
//!
//! The public API from this module is [`SerialQueue`], its [`QueueBuilder`],
//! [`QueueConfig`] and [`QueueStatus`].
//!
//! Internal modules:
//! - [`shared`]: backlog, status and slot counter behind one mutex; the drain step;
//! - [`slot`]: runs one task against its timer and advances the queue once;
//! - [`builder`]: wires the bus forwarder and subscriber workers.

mod builder;
mod config;
mod queue;
mod shared;
mod slot;
mod status;

pub use builder::QueueBuilder;
pub use config::{DEFAULT_TIMEOUT, QueueConfig};
pub use queue::SerialQueue;
pub use status::QueueStatus;
