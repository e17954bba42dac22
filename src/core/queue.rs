//! # SerialQueue: the public face of the executor.
//!
//! [`SerialQueue`] accepts asynchronous actions and runs them one at a time,
//! in submission order, each under the queue's timeout.
//!
//! ## Two channels
//! - [`SerialQueue::submit`] returns `Err(SubmitError)` **immediately** when
//!   the task cannot be queued (queue closed). Nothing was queued then.
//! - Otherwise it returns a [`TaskHandle`] that settles **later** with the
//!   action's value, or its own error wrapped in
//!   [`TaskError::Fail`](crate::TaskError::Fail).
//!
//! ## Timeouts
//! When a task exceeds the timeout, its `on_timeout` callback fires and the
//! next task starts. The slow action is *not* cancelled: it keeps running and
//! its handle still settles with the real outcome.
//!
//! ## Example
//! ```rust
//! use std::convert::Infallible;
//! use std::time::Duration;
//! use serq::SerialQueue;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let queue = SerialQueue::with_timeout(Duration::from_secs(1));
//!
//!     let first = queue.submit(|_ctx| async {
//!         tokio::time::sleep(Duration::from_millis(10)).await;
//!         Ok::<_, Infallible>("first")
//!     })?;
//!     let second = queue.submit(|_ctx| async { Ok::<_, Infallible>("second") })?;
//!
//!     assert_eq!(first.await?, "first");
//!     assert_eq!(second.await?, "second");
//!
//!     queue.close();
//!     assert!(queue.submit(|_ctx| async { Ok::<_, Infallible>(()) }).is_err());
//!     Ok(())
//! }
//! ```

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use super::builder::QueueBuilder;
use super::config::QueueConfig;
use super::shared::Shared;
use super::status::QueueStatus;
use crate::deferred::{self, TaskHandle};
use crate::error::SubmitError;
use crate::events::{Event, EventKind};
use crate::tasks::{SubmitOptions, TaskRecord};

/// Serial task executor with per-task timeout and skip-ahead.
///
/// Cloning is cheap and yields another handle to the same queue.
/// Dropping every handle does not discard queued work; it still drains.
#[derive(Clone)]
pub struct SerialQueue {
    shared: Arc<Shared>,
}

impl SerialQueue {
    /// Creates a queue with the given configuration and no subscribers.
    ///
    /// # Panics
    /// Panics if called outside a Tokio runtime; use
    /// [`QueueBuilder::with_runtime`] to pass a handle explicitly.
    pub fn new(cfg: QueueConfig) -> Self {
        QueueBuilder::new(cfg).build()
    }

    /// Creates a queue with the default configuration and the given timeout.
    ///
    /// # Panics
    /// Panics if called outside a Tokio runtime.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::new(QueueConfig {
            timeout,
            ..QueueConfig::default()
        })
    }

    /// Returns a builder for a queue with subscribers or an explicit runtime.
    pub fn builder(cfg: QueueConfig) -> QueueBuilder {
        QueueBuilder::new(cfg)
    }

    pub(crate) fn from_shared(shared: Arc<Shared>) -> Self {
        Self { shared }
    }

    /// Queues `action` with default options.
    ///
    /// See [`submit_with`](Self::submit_with).
    pub fn submit<T, E, F, Fut>(&self, action: F) -> Result<TaskHandle<T, E>, SubmitError>
    where
        T: Send + 'static,
        E: fmt::Display + Send + 'static,
        F: FnOnce(CancellationToken) -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        self.submit_with(action, SubmitOptions::default())
    }

    /// Queues `action` and returns a handle to its eventual outcome.
    ///
    /// The action receives a [`CancellationToken`] that is only cancelled on
    /// timeout when [`SubmitOptions::cancel_on_timeout`] is set. An `Err(e)`
    /// from the action reaches the handle as [`TaskError::Fail(e)`](crate::TaskError::Fail).
    ///
    /// ### Flow
    /// 1. Reject with [`SubmitError::Closed`] if the queue is closed
    /// 2. Append the task to the backlog
    /// 3. If idle: mark busy and schedule the drain loop as a separate task,
    ///    so further synchronous submissions are queued before the first runs
    pub fn submit_with<T, E, F, Fut>(
        &self,
        action: F,
        opts: SubmitOptions,
    ) -> Result<TaskHandle<T, E>, SubmitError>
    where
        T: Send + 'static,
        E: fmt::Display + Send + 'static,
        F: FnOnce(CancellationToken) -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        let (kick, handle) = {
            let mut st = self.shared.lock();
            if !st.status.accepts_submissions() {
                let err = SubmitError::Closed;
                self.shared.bus.publish(
                    Event::new(EventKind::SubmitRejected)
                        .with_task_opt(opts.name.as_ref())
                        .with_reason(err.as_label()),
                );
                return Err(err);
            }

            let (d, handle) = deferred::create::<T, E>();
            let name = opts.name.clone();
            st.backlog.push_back(TaskRecord::new(action, d, opts));
            self.shared.bus.publish(
                Event::new(EventKind::TaskQueued)
                    .with_task_opt(name.as_ref())
                    .with_pending(st.backlog.len()),
            );

            let kick = (st.status == QueueStatus::Idle).then(|| {
                st.status = QueueStatus::Busy;
                st.current_id
            });
            (kick, handle)
        };

        if let Some(expected) = kick {
            self.shared.schedule_drain(expected);
        }
        Ok(handle)
    }

    /// Stops accepting submissions. Idempotent.
    ///
    /// Tasks already in the backlog still run to completion.
    pub fn close(&self) {
        let mut st = self.shared.lock();
        if st.status == QueueStatus::Closed {
            return;
        }
        st.status = QueueStatus::Closed;
        self.shared
            .bus
            .publish(Event::new(EventKind::QueueClosed).with_pending(st.backlog.len()));
    }

    /// Current lifecycle status.
    pub fn status(&self) -> QueueStatus {
        self.shared.lock().status
    }

    /// Returns true once [`close`](Self::close) has been called.
    pub fn is_closed(&self) -> bool {
        self.status() == QueueStatus::Closed
    }

    /// Number of tasks waiting in the backlog (excludes the running one).
    pub fn pending(&self) -> usize {
        self.shared.lock().backlog.len()
    }

    /// Id of the most recently started slot (`0` before the first task).
    pub fn current_slot(&self) -> u64 {
        self.shared.lock().current_id
    }

    /// Slot whose timer is currently armed, if any.
    pub fn active_slot(&self) -> Option<u64> {
        self.shared.lock().armed
    }

    /// Per-task timeout of this queue.
    pub fn timeout(&self) -> Duration {
        self.shared.cfg.timeout
    }

    /// Returns a raw receiver of queue events published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.shared.bus.subscribe()
    }
}

impl fmt::Debug for SerialQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let st = self.shared.lock();
        f.debug_struct("SerialQueue")
            .field("status", &st.status)
            .field("pending", &st.backlog.len())
            .field("current_slot", &st.current_id)
            .field("timeout", &self.shared.cfg.timeout)
            .finish()
    }
}
