//! # Deferred results.
//!
//! A [`Deferred`] is the producer side of a pending result: it carries an
//! explicit completion trigger ([`Deferred::resolve`]) and failure trigger
//! ([`Deferred::reject`]). The consumer side is a [`TaskHandle`], a future that
//! yields the settled value exactly once.
//!
//! ## Rules
//! - The first `resolve`/`reject` wins; later calls are no-ops and return `false`.
//! - If every `Deferred` clone is dropped unsettled, the handle yields
//!   [`TaskError::Abandoned`] instead of hanging.
//!
//! ## Example
//! ```rust
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! use serq::deferred;
//!
//! let (d, handle) = deferred::create::<u32, String>();
//! assert!(d.resolve(7));
//! assert!(!d.reject("too late".into()));
//! assert_eq!(handle.await, Ok(7));
//! # }
//! ```

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};
use std::task::{Context, Poll};

use tokio::sync::oneshot;

use crate::error::TaskError;

type Outcome<T, E> = Result<T, TaskError<E>>;

/// Creates a pending result: the trigger side and the awaitable side.
///
/// `E` is the failure type passed to [`Deferred::reject`].
pub fn create<T, E>() -> (Deferred<T, E>, TaskHandle<T, E>) {
    let (tx, rx) = oneshot::channel();
    (
        Deferred {
            tx: Arc::new(Mutex::new(Some(tx))),
        },
        TaskHandle { rx },
    )
}

/// Trigger side of a pending result. Cloning shares the same trigger.
pub struct Deferred<T, E> {
    tx: Arc<Mutex<Option<oneshot::Sender<Outcome<T, E>>>>>,
}

impl<T, E> Clone for Deferred<T, E> {
    fn clone(&self) -> Self {
        Self {
            tx: Arc::clone(&self.tx),
        }
    }
}

impl<T, E> Deferred<T, E> {
    /// Settles the result with a value. Returns `false` if already settled.
    pub fn resolve(&self, value: T) -> bool {
        self.settle(Ok(value))
    }

    /// Settles the result with a failure. Returns `false` if already settled.
    ///
    /// The handle yields it as [`TaskError::Fail`], unchanged.
    pub fn reject(&self, error: E) -> bool {
        self.settle(Err(TaskError::Fail(error)))
    }

    /// Settles the result with an outcome. Returns `false` if already settled.
    ///
    /// A dropped handle still counts as settling: the trigger is consumed.
    pub fn settle(&self, outcome: Outcome<T, E>) -> bool {
        let sender = self
            .tx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        match sender {
            Some(tx) => {
                let _ = tx.send(outcome);
                true
            }
            None => false,
        }
    }

    /// Returns true once `resolve`, `reject` or `settle` has been called.
    pub fn is_settled(&self) -> bool {
        self.tx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }
}

/// Caller-visible future of a submitted task.
///
/// Resolves to the action's value, its own failure wrapped in
/// [`TaskError::Fail`], or [`TaskError::Abandoned`] if the task was dropped
/// unsettled.
/// Dropping the handle does not affect the task; it still runs in its turn.
#[must_use = "dropping a TaskHandle discards the task's result (the task still runs)"]
#[derive(Debug)]
pub struct TaskHandle<T, E> {
    rx: oneshot::Receiver<Outcome<T, E>>,
}

impl<T, E> TaskHandle<T, E> {
    /// Returns the outcome if the task has already settled, without waiting.
    ///
    /// Returns `None` while pending. After `Some` is returned the handle is spent.
    pub fn try_outcome(&mut self) -> Option<Outcome<T, E>> {
        match self.rx.try_recv() {
            Ok(outcome) => Some(outcome),
            Err(oneshot::error::TryRecvError::Empty) => None,
            Err(oneshot::error::TryRecvError::Closed) => Some(Err(TaskError::Abandoned)),
        }
    }
}

impl<T, E> Future for TaskHandle<T, E> {
    type Output = Outcome<T, E>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|res| res.unwrap_or(Err(TaskError::Abandoned)))
    }
}
