//! Queue events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish/subscribe to events emitted by the queue, its slot drivers and
//! subscriber workers.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `SerialQueue::submit`, `SerialQueue::close`, the slot
//!   driver, and `SubscriberSet` workers (overflow/panic).
//! - **Consumers**: the forwarder spawned by `QueueBuilder::build` (fans out to
//!   `SubscriberSet`) and any receiver obtained from `SerialQueue::subscribe`.

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
