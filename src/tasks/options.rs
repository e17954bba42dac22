//! # Per-submission options.
//!
//! [`SubmitOptions`] carries everything about a submission that is not the
//! action itself: an optional name for events, an optional timeout callback,
//! and whether the action's token is cancelled when its slot times out.
//!
//! ## Example
//! ```rust
//! use serq::SubmitOptions;
//!
//! let opts = SubmitOptions::new()
//!     .with_name("sync-inbox")
//!     .on_timeout(|| eprintln!("sync-inbox is slow"))
//!     .cancel_on_timeout(true);
//! assert_eq!(opts.name(), Some("sync-inbox"));
//! ```

use std::fmt;
use std::sync::Arc;

/// Callback invoked at most once when a task's slot times out.
pub type TimeoutCallback = Box<dyn FnOnce() + Send + 'static>;

/// Options for [`SerialQueue::submit_with`](crate::SerialQueue::submit_with).
#[derive(Default)]
pub struct SubmitOptions {
    pub(crate) name: Option<Arc<str>>,
    pub(crate) on_timeout: Option<TimeoutCallback>,
    pub(crate) cancel_on_timeout: bool,
}

impl SubmitOptions {
    /// Empty options: no name, no callback, token never cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Names the task; the name only appears in events.
    pub fn with_name(mut self, name: impl Into<Arc<str>>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the callback fired when the task's timer expires before it settles.
    ///
    /// The callback runs on the slot driver, before the queue advances; keep it short.
    pub fn on_timeout<F>(mut self, f: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        self.on_timeout = Some(Box::new(f));
        self
    }

    /// When `true`, the action's [`CancellationToken`](tokio_util::sync::CancellationToken)
    /// is cancelled on timeout.
    ///
    /// Cancellation is cooperative: the action keeps running until it observes
    /// the token, and its handle still settles with whatever it returns.
    pub fn cancel_on_timeout(mut self, yes: bool) -> Self {
        self.cancel_on_timeout = yes;
        self
    }

    /// Returns the task name, if set.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

impl fmt::Debug for SubmitOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubmitOptions")
            .field("name", &self.name)
            .field("on_timeout", &self.on_timeout.is_some())
            .field("cancel_on_timeout", &self.cancel_on_timeout)
            .finish()
    }
}
