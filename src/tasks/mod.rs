//! # Task records and submission options.
//!
//! This module provides the task-related types:
//! - [`SubmitOptions`] - name, timeout callback and cancellation opt-in
//! - `TaskRecord` - a queued action bound to its [`Deferred`](crate::deferred::Deferred)

mod options;
mod record;

pub use options::{SubmitOptions, TimeoutCallback};
pub(crate) use record::{Settlement, StartedRecord, TaskRecord, panic_message};
