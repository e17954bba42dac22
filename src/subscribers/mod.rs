//! # Event subscribers.
//!
//! This module provides the [`Subscribe`] trait, the [`SubscriberSet`] fan-out
//! and (behind the `logging` feature) a stdout [`LogWriter`].
//!
//! ```text
//! slot driver ── publish(Event) ──► Bus ──► forwarder ──► SubscriberSet::emit
//!                                                            ┌────┴────┐
//!                                                            ▼         ▼
//!                                                        LogWriter   Custom
//! ```

#[cfg(feature = "logging")]
mod log;
mod set;
mod subscribe;

#[cfg(feature = "logging")]
pub use log::LogWriter;
pub use set::SubscriberSet;
pub use subscribe::Subscribe;
