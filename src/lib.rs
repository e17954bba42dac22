//! # serq
//!
//! **serq** is a serial task queue for Tokio.
//!
//! Submitted async actions run **one at a time, in submission order**. Each
//! task runs under a per-queue timeout: when it expires, the queue stops
//! waiting and starts the next task, while the slow action keeps running in
//! the background and still settles its own handle.
//!
//! ## Architecture
//! ```text
//!   submit(action) ──► Result<TaskHandle<T, E>, SubmitError> (immediate)
//!        │
//!        ▼
//! ┌──────────────────────────────────────────────────────────────┐
//! │  SerialQueue (Shared state behind one mutex)                 │
//! │  - status: Idle | Busy | Closed                              │
//! │  - backlog: VecDeque<TaskRecord>   (FIFO)                    │
//! │  - current_id: slot counter        (one per started task)    │
//! │  - armed: slot with a live timer   (at most one)             │
//! └──────┬───────────────────────────────────────────────────────┘
//!        │ drain(expected_slot)   ── stale if expected != current_id
//!        ▼
//! ┌──────────────────────┐   settled ──► TaskHandle ◄── caller .await
//! │ slot driver (slot=n) │──────────────► drain(n)
//! │ select! { action,    │
//! │           timer }    │   timer ────► on_timeout(), drain(n)
//! └──────────────────────┘               action keeps running; its later
//!        │                               drain(n) is discarded as stale
//!        ▼
//!      Bus ──► SubscriberSet ──► Subscribe::on_event (LogWriter, custom)
//! ```
//!
//! ## Features
//! | Area              | Description                                                  | Key types / traits                        |
//! |-------------------|--------------------------------------------------------------|-------------------------------------------|
//! | **Queue**         | Serial execution, timeout skip-ahead, close.                 | [`SerialQueue`], [`QueueStatus`]          |
//! | **Results**       | Per-task future, settled exactly once.                       | [`TaskHandle`], [`deferred::Deferred`]    |
//! | **Options**       | Task name, timeout callback, cooperative cancel on timeout.  | [`SubmitOptions`]                         |
//! | **Errors**        | Synchronous submit errors vs. the action's own failures.     | [`SubmitError`], [`TaskError`]            |
//! | **Events**        | Queue lifecycle events and pluggable subscribers.            | [`Event`], [`EventKind`], [`Subscribe`]   |
//! | **Configuration** | Timeout and bus capacity; builder for subscribers/runtime.   | [`QueueConfig`], [`QueueBuilder`]         |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] _(demo/reference only)_.
//!
//! ## Example
//! ```rust
//! use std::io;
//! use std::sync::{Arc, Mutex};
//! use std::time::Duration;
//! use serq::{SerialQueue, SubmitOptions};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let queue = SerialQueue::with_timeout(Duration::from_millis(50));
//!     let timed_out = Arc::new(Mutex::new(false));
//!
//!     let flag = Arc::clone(&timed_out);
//!     let slow = queue.submit_with(
//!         |_ctx| async {
//!             tokio::time::sleep(Duration::from_millis(100)).await;
//!             Ok::<_, io::Error>("slow done")
//!         },
//!         SubmitOptions::new().on_timeout(move || *flag.lock().unwrap() = true),
//!     )?;
//!     let fast = queue.submit(|_ctx| async { Ok::<_, io::Error>("fast done") })?;
//!
//!     // `fast` is not blocked by `slow`; `slow` still delivers its real result.
//!     assert_eq!(fast.await?, "fast done");
//!     assert_eq!(slow.await?, "slow done");
//!     assert!(*timed_out.lock().unwrap());
//!     Ok(())
//! }
//! ```

mod core;
pub mod deferred;
mod error;
mod events;
mod subscribers;
mod tasks;

// ---- Public re-exports ----

pub use crate::core::{DEFAULT_TIMEOUT, QueueBuilder, QueueConfig, QueueStatus, SerialQueue};
pub use deferred::TaskHandle;
pub use error::{SubmitError, TaskError};
pub use events::{Bus, Event, EventKind};
pub use subscribers::{Subscribe, SubscriberSet};
pub use tasks::{SubmitOptions, TimeoutCallback};

// Optional: expose a simple built-in logger subscriber (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
