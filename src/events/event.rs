//! # Runtime events emitted by the queue and its slot driver.
//!
//! The [`EventKind`] enum classifies event types across three categories:
//! - **Submission events**: a task entered the backlog or was rejected
//! - **Slot events**: a task started, settled, failed or hit its timeout
//! - **Queue events**: the queue went idle or was closed
//!
//! The [`Event`] struct carries additional metadata such as timestamps, slot id,
//! task name and failure reasons.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//! Use `seq` to restore the exact order when events are delivered out of order.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use serq::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::TimeoutHit)
//!     .with_task("fetch")
//!     .with_slot(3)
//!     .with_timeout(Duration::from_millis(200));
//!
//! assert_eq!(ev.kind, EventKind::TimeoutHit);
//! assert_eq!(ev.task.as_deref(), Some("fetch"));
//! assert_eq!(ev.slot, Some(3));
//! assert_eq!(ev.timeout_ms, Some(200));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Subscriber events ===
    /// Subscriber panicked during event processing.
    ///
    /// Sets:
    /// - `task`: subscriber name
    /// - `reason`: panic info/message
    SubscriberPanicked,

    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets:
    /// - `task`: subscriber name
    /// - `reason`: reason string (e.g., "full", "closed")
    SubscriberOverflow,

    // === Submission events ===
    /// Task was appended to the backlog.
    ///
    /// Sets:
    /// - `task`: task name (if any)
    /// - `pending`: backlog length after the push
    TaskQueued,

    /// Submission refused because the queue is closed.
    ///
    /// Sets:
    /// - `task`: task name (if any)
    /// - `reason`: rejection label
    SubmitRejected,

    // === Slot events ===
    /// Task was dequeued and its action is about to run.
    ///
    /// Sets:
    /// - `task`: task name (if any)
    /// - `slot`: assigned slot id
    /// - `timeout_ms`: armed timeout (ms)
    TaskStarting,

    /// Action completed with a value while its slot was still live.
    ///
    /// Sets:
    /// - `task`, `slot`
    TaskSettled,

    /// Action completed with a failure while its slot was still live.
    ///
    /// Sets:
    /// - `task`, `slot`
    /// - `reason`: failure message
    TaskFailed,

    /// Slot timer fired before the action settled; the queue moves on.
    ///
    /// Sets:
    /// - `task`, `slot`
    /// - `timeout_ms`: the timeout that expired (ms)
    TimeoutHit,

    /// A previously timed-out action finally settled in the background.
    ///
    /// Its handle has been settled; the queue ignores the completion.
    ///
    /// Sets:
    /// - `task`, `slot`
    /// - `reason`: failure message (only if the action failed)
    LateSettled,

    // === Queue events ===
    /// Backlog drained: the queue returned to idle, or is closed and empty.
    ///
    /// Sets:
    /// - `slot`: last assigned slot id
    QueueIdle,

    /// Queue was closed; pending tasks still drain.
    ///
    /// Sets:
    /// - `pending`: backlog length at close time
    QueueClosed,
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,

    /// Event classification.
    pub kind: EventKind,
    /// Slot id the event refers to.
    pub slot: Option<u64>,
    /// Name of the task, if one was given at submission.
    pub task: Option<Arc<str>>,
    /// Human-readable reason (errors, overflow details, etc.).
    pub reason: Option<Arc<str>>,
    /// Slot timeout in milliseconds (compact).
    pub timeout_ms: Option<u32>,
    /// Backlog length observed when the event was created.
    pub pending: Option<u32>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            slot: None,
            task: None,
            reason: None,
            timeout_ms: None,
            pending: None,
        }
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches a task name.
    #[inline]
    pub fn with_task(mut self, task: impl Into<Arc<str>>) -> Self {
        self.task = Some(task.into());
        self
    }

    /// Attaches the task name when there is one.
    #[inline]
    pub fn with_task_opt(mut self, task: Option<&Arc<str>>) -> Self {
        self.task = task.cloned();
        self
    }

    /// Attaches a slot id.
    #[inline]
    pub fn with_slot(mut self, slot: u64) -> Self {
        self.slot = Some(slot);
        self
    }

    /// Attaches a timeout duration (stored as milliseconds).
    #[inline]
    pub fn with_timeout(mut self, d: Duration) -> Self {
        let ms = d.as_millis().min(u128::from(u32::MAX)) as u32;
        self.timeout_ms = Some(ms);
        self
    }

    /// Attaches the backlog length (saturated to `u32::MAX`).
    #[inline]
    pub fn with_pending(mut self, n: usize) -> Self {
        self.pending = Some(u32::try_from(n).unwrap_or(u32::MAX));
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_task(subscriber)
            .with_reason(format!("subscriber={subscriber} reason={reason}"))
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_task(subscriber)
            .with_reason(info)
    }

    /// Returns true for events that describe a specific slot.
    #[inline]
    pub fn is_slot_event(&self) -> bool {
        matches!(
            self.kind,
            EventKind::TaskStarting
                | EventKind::TaskSettled
                | EventKind::TaskFailed
                | EventKind::TimeoutHit
                | EventKind::LateSettled
        )
    }
}
