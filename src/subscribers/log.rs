//! # LogWriter — simple event printer
//!
//! A minimal subscriber that prints incoming [`Event`]s to stdout.
//! Use it for tests or demos.
//!
//! ## Example output
//! ```text
//! [queued] task="fetch" pending=1
//! [starting] task="fetch" slot=1 timeout=200ms
//! [timeout] task="fetch" slot=1 timeout=200ms
//! [starting] task=None slot=2 timeout=200ms
//! [late-settled] task="fetch" slot=1 err=None
//! [settled] task=None slot=2
//! [idle] last_slot=2
//! [closed] pending=0
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        match e.kind {
            EventKind::TaskQueued => {
                println!("[queued] task={:?} pending={:?}", e.task, e.pending);
            }
            EventKind::SubmitRejected => {
                println!("[rejected] task={:?} reason={:?}", e.task, e.reason);
            }
            EventKind::TaskStarting => {
                println!(
                    "[starting] task={:?} slot={:?} timeout={:?}ms",
                    e.task, e.slot, e.timeout_ms
                );
            }
            EventKind::TaskSettled => {
                println!("[settled] task={:?} slot={:?}", e.task, e.slot);
            }
            EventKind::TaskFailed => {
                println!(
                    "[failed] task={:?} slot={:?} err={:?}",
                    e.task, e.slot, e.reason
                );
            }
            EventKind::TimeoutHit => {
                println!(
                    "[timeout] task={:?} slot={:?} timeout={:?}ms",
                    e.task, e.slot, e.timeout_ms
                );
            }
            EventKind::LateSettled => {
                println!(
                    "[late-settled] task={:?} slot={:?} err={:?}",
                    e.task, e.slot, e.reason
                );
            }
            EventKind::QueueIdle => {
                println!("[idle] last_slot={:?}", e.slot);
            }
            EventKind::QueueClosed => {
                println!("[closed] pending={:?}", e.pending);
            }
            EventKind::SubscriberOverflow | EventKind::SubscriberPanicked => {
                println!("[subscriber] {:?}: {:?}", e.kind, e.reason);
            }
        }
    }

    fn name(&self) -> &'static str {
        "log-writer"
    }
}
