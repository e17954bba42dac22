//! Error types used by the queue and by submitted tasks.
//!
//! This module defines two error enums, matching the two channels a caller
//! observes:
//!
//! - [`SubmitError`] — returned synchronously by [`SerialQueue::submit`](crate::SerialQueue::submit)
//!   when the task could not be queued at all.
//! - [`TaskError`] — delivered asynchronously through the task's own
//!   [`TaskHandle`](crate::TaskHandle) when the task was queued but did not
//!   produce a value.
//!
//! Both types provide helper methods (`as_label`, `as_message`) for logging.

use std::fmt;

use thiserror::Error;

/// # Errors produced when a task is submitted.
///
/// A submit error means nothing was queued and no handle exists.
#[non_exhaustive]
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitError {
    /// The queue was closed; it accepts no further submissions.
    #[error("queue is closed")]
    Closed,
}

impl SubmitError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use serq::SubmitError;
    ///
    /// assert_eq!(SubmitError::Closed.as_label(), "submit_closed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            SubmitError::Closed => "submit_closed",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            SubmitError::Closed => "submit rejected: queue is closed".to_string(),
        }
    }
}

/// # Errors produced by task execution.
///
/// A task error only ever reaches the handle of the task that produced it.
/// It never stops the queue and never affects sibling tasks.
///
/// `E` is the action's own failure type. [`TaskError::Fail`] carries that
/// value untouched; the other variants are raised by the queue itself.
///
/// Timeouts are **not** errors: a timed-out task keeps running and its handle
/// still settles with the real outcome.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaskError<E> {
    /// The action returned a failure.
    #[error("{0}")]
    Fail(E),

    /// The action panicked while running.
    #[error("task panicked: {info}")]
    Panicked {
        /// Panic payload, if it was a string.
        info: String,
    },

    /// The task was dropped before it settled (runtime shut down).
    #[error("task abandoned before it settled")]
    Abandoned,
}

impl<E> TaskError<E> {
    /// Returns the action's own failure, if that is what this is.
    ///
    /// # Example
    /// ```
    /// use serq::TaskError;
    ///
    /// let err: TaskError<&str> = TaskError::Fail("boom");
    /// assert_eq!(err.into_failure(), Some("boom"));
    /// ```
    pub fn into_failure(self) -> Option<E> {
        match self {
            TaskError::Fail(e) => Some(e),
            _ => None,
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use serq::TaskError;
    ///
    /// assert_eq!(TaskError::<()>::Abandoned.as_label(), "task_abandoned");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            TaskError::Fail(_) => "task_failed",
            TaskError::Panicked { .. } => "task_panicked",
            TaskError::Abandoned => "task_abandoned",
        }
    }
}

impl<E: fmt::Display> TaskError<E> {
    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            TaskError::Fail(e) => format!("error: {e}"),
            TaskError::Panicked { info } => format!("panic: {info}"),
            TaskError::Abandoned => "abandoned before settling".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;

    #[test]
    fn test_labels_are_stable() {
        assert_eq!(SubmitError::Closed.as_label(), "submit_closed");
        assert_eq!(TaskError::Fail("x").as_label(), "task_failed");
        assert_eq!(
            TaskError::<()>::Panicked { info: "p".into() }.as_label(),
            "task_panicked"
        );
        assert_eq!(TaskError::<()>::Abandoned.as_label(), "task_abandoned");
    }

    #[test]
    fn test_messages_carry_details() {
        assert_eq!(TaskError::Fail("disk full").as_message(), "error: disk full");
        assert_eq!(
            TaskError::<&str>::Panicked { info: "oops".into() }.as_message(),
            "panic: oops"
        );
        assert!(SubmitError::Closed.as_message().contains("closed"));
    }

    #[test]
    fn test_failure_displays_as_the_inner_error() {
        let err = TaskError::Fail(io::Error::new(io::ErrorKind::NotFound, "an error"));
        assert_eq!(err.to_string(), "an error");

        let inner = err.into_failure().expect("fail variant");
        assert_eq!(inner.kind(), io::ErrorKind::NotFound);
    }
}
