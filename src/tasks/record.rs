//! # Task records.
//!
//! A [`TaskRecord`] is what sits in the backlog: the user's action, already
//! bound to its [`Deferred`] and type-erased so records of different output
//! types share one queue.
//!
//! Running a record yields a [`Settlement`]: the handle has been settled by
//! then, and the settlement only tells the slot driver what happened.

use std::any::Any;
use std::fmt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;
use tokio_util::sync::CancellationToken;

use crate::deferred::Deferred;
use crate::error::TaskError;
use crate::tasks::options::{SubmitOptions, TimeoutCallback};

type BoxedAction = Box<dyn FnOnce(CancellationToken) -> BoxFuture<'static, Settlement> + Send>;

/// What a finished action did, after its handle was settled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Settlement {
    /// The action produced a value.
    Settled,
    /// The action failed or panicked; carries the rendered error.
    Failed(String),
}

/// One queued unit of work plus its completion wiring.
pub(crate) struct TaskRecord {
    pub(crate) name: Option<Arc<str>>,
    pub(crate) on_timeout: Option<TimeoutCallback>,
    pub(crate) cancel_on_timeout: bool,
    action: BoxedAction,
}

impl TaskRecord {
    /// Binds `action` to `deferred`; the resulting record settles it exactly once.
    pub(crate) fn new<T, E, F, Fut>(action: F, deferred: Deferred<T, E>, opts: SubmitOptions) -> Self
    where
        T: Send + 'static,
        E: fmt::Display + Send + 'static,
        F: FnOnce(CancellationToken) -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        let action: BoxedAction = Box::new(move |ctx: CancellationToken| {
            async move {
                let outcome = match AssertUnwindSafe(async move { action(ctx).await })
                    .catch_unwind()
                    .await
                {
                    Ok(res) => res.map_err(TaskError::Fail),
                    Err(panic_err) => Err(TaskError::Panicked {
                        info: panic_message(&*panic_err),
                    }),
                };
                let settlement = match &outcome {
                    Ok(_) => Settlement::Settled,
                    Err(e) => Settlement::Failed(e.to_string()),
                };
                deferred.settle(outcome);
                settlement
            }
            .boxed()
        });

        Self {
            name: opts.name,
            on_timeout: opts.on_timeout,
            cancel_on_timeout: opts.cancel_on_timeout,
            action,
        }
    }

    /// Splits off the action future; the remaining fields stay with the caller.
    pub(crate) fn start(self, ctx: CancellationToken) -> (StartedRecord, BoxFuture<'static, Settlement>) {
        let fut = (self.action)(ctx);
        (
            StartedRecord {
                name: self.name,
                on_timeout: self.on_timeout,
                cancel_on_timeout: self.cancel_on_timeout,
            },
            fut,
        )
    }
}

/// Metadata of a record whose action has been handed to the slot driver.
pub(crate) struct StartedRecord {
    pub(crate) name: Option<Arc<str>>,
    pub(crate) on_timeout: Option<TimeoutCallback>,
    pub(crate) cancel_on_timeout: bool,
}

/// Extracts a readable message from a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
