//! # Queue status.
//!
//! ```text
//!          submit                 backlog empty
//!   Idle ─────────► Busy ─────────────────────► Idle
//!     │               │
//!     └──── close ────┴──► Closed   (terminal; backlog still drains)
//! ```

use std::fmt;

/// Lifecycle state of a [`SerialQueue`](crate::SerialQueue).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueStatus {
    /// No task running and the backlog is empty.
    Idle,
    /// A task is running, or a finished task's continuation is pending.
    Busy,
    /// No further submissions; already-queued tasks still drain.
    Closed,
}

impl QueueStatus {
    /// Returns true if the queue accepts submissions.
    #[inline]
    pub fn accepts_submissions(self) -> bool {
        matches!(self, QueueStatus::Idle | QueueStatus::Busy)
    }

    /// Returns true if the drain loop may pop tasks.
    #[inline]
    pub(crate) fn is_draining(self) -> bool {
        matches!(self, QueueStatus::Busy | QueueStatus::Closed)
    }

    /// Short stable label for logs.
    pub fn as_label(self) -> &'static str {
        match self {
            QueueStatus::Idle => "idle",
            QueueStatus::Busy => "busy",
            QueueStatus::Closed => "closed",
        }
    }
}

impl fmt::Display for QueueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}
