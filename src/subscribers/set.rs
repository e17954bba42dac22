//! # Non-blocking event fan-out to multiple subscribers.
//!
//! Provides [`SubscriberSet`] — distributes events to multiple subscribers
//! concurrently without blocking the queue.
//!
//! ## Architecture
//! ```text
//! emit(event)
//!     │
//!     ├──► [queue 1] ──► worker 1 ──► subscriber1.on_event()
//!     │    (bounded)         └──────► panic → SubscriberPanicked
//!     └──► [queue N] ──► worker N ──► subscriberN.on_event()
//!          (bounded)
//! ```
//!
//! ## Rules
//! - **Overflow**: event dropped for that subscriber only, `SubscriberOverflow` published
//! - **Non-blocking**: `emit()` returns immediately (uses `try_send`)
//! - **Isolation**: slow/panicking subscriber doesn't affect others
//! - **Per-subscriber FIFO**: each subscriber sees events in order
//!
//! **Warning**: `AssertUnwindSafe` is used, which can leave shared state inconsistent
//! if a subscriber uses `Arc<Mutex<T>>` and panics while holding the lock.

use std::sync::Arc;

use futures::FutureExt;
use tokio::{runtime::Handle, sync::mpsc, task::JoinHandle};

use crate::events::{Bus, Event, EventKind};
use crate::subscribers::Subscribe;
use crate::tasks::panic_message;

/// Per-subscriber channel metadata.
struct SubscriberChannel {
    name: &'static str,
    sender: mpsc::Sender<Arc<Event>>,
}

/// Fan-out coordinator for multiple event subscribers.
///
/// Each subscriber gets a dedicated bounded queue and worker task; panics are
/// caught and reported, dropped events are reported via `SubscriberOverflow`.
pub struct SubscriberSet {
    channels: Vec<SubscriberChannel>,
    workers: Vec<JoinHandle<()>>,
    bus: Bus,
}

impl SubscriberSet {
    /// Creates a new set and spawns one worker task per subscriber on `runtime`.
    ///
    /// Minimum queue capacity is 1 (enforced).
    #[must_use]
    pub fn new(subs: Vec<Arc<dyn Subscribe>>, bus: Bus, runtime: &Handle) -> Self {
        let mut channels = Vec::with_capacity(subs.len());
        let mut workers = Vec::with_capacity(subs.len());

        for sub in subs {
            let cap = sub.queue_capacity().max(1);
            let name = sub.name();
            let (tx, mut rx) = mpsc::channel::<Arc<Event>>(cap);
            let bus_for_worker = bus.clone();

            let handle = runtime.spawn(async move {
                while let Some(ev) = rx.recv().await {
                    let fut = sub.on_event(ev.as_ref());
                    if let Err(panic_err) = std::panic::AssertUnwindSafe(fut).catch_unwind().await {
                        bus_for_worker
                            .publish(Event::subscriber_panicked(name, panic_message(&*panic_err)));
                    }
                }
            });
            channels.push(SubscriberChannel { name, sender: tx });
            workers.push(handle);
        }
        Self {
            channels,
            workers,
            bus,
        }
    }

    /// Number of registered subscribers.
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    /// Returns true when no subscribers are registered.
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Emits a pre-allocated `Arc<Event>` to all subscribers.
    ///
    /// - Uses `try_send` (non-blocking)
    /// - On queue full or closed: drops event, publishes `SubscriberOverflow`
    ///
    /// `SubscriberOverflow` events are not re-published if they themselves overflow.
    pub fn emit_arc(&self, event: Arc<Event>) {
        let is_overflow_evt = matches!(event.kind, EventKind::SubscriberOverflow);

        for channel in &self.channels {
            let reason = match channel.sender.try_send(Arc::clone(&event)) {
                Ok(()) => continue,
                Err(mpsc::error::TrySendError::Full(_)) => "full",
                Err(mpsc::error::TrySendError::Closed(_)) => "closed",
            };
            if !is_overflow_evt {
                self.bus
                    .publish(Event::subscriber_overflow(channel.name, reason));
            }
        }
    }

    /// Emits an event to all subscribers (clones the event).
    pub fn emit(&self, event: &Event) {
        self.emit_arc(Arc::new(event.clone()));
    }

    /// Gracefully shuts down all subscriber workers.
    ///
    /// Drops the channel senders, then awaits every worker so queued events
    /// are fully processed.
    pub async fn shutdown(self) {
        drop(self.channels);

        for h in self.workers {
            let _ = h.await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct Recorder {
        seen: Mutex<Vec<EventKind>>,
    }

    #[async_trait]
    impl Subscribe for Recorder {
        async fn on_event(&self, event: &Event) {
            self.seen.lock().unwrap().push(event.kind);
        }
        fn name(&self) -> &'static str {
            "recorder"
        }
    }

    struct Exploder;

    #[async_trait]
    impl Subscribe for Exploder {
        async fn on_event(&self, _event: &Event) {
            panic!("exploder always panics");
        }
        fn name(&self) -> &'static str {
            "exploder"
        }
    }

    #[tokio::test]
    async fn test_emit_reaches_every_subscriber_in_order() {
        let bus = Bus::new(16);
        let rec = Arc::new(Recorder {
            seen: Mutex::new(Vec::new()),
        });
        let set = SubscriberSet::new(vec![rec.clone()], bus, &Handle::current());
        assert_eq!(set.len(), 1);

        set.emit(&Event::new(EventKind::TaskQueued));
        set.emit(&Event::new(EventKind::TaskStarting));
        set.emit(&Event::new(EventKind::QueueIdle));
        set.shutdown().await;

        assert_eq!(
            *rec.seen.lock().unwrap(),
            vec![
                EventKind::TaskQueued,
                EventKind::TaskStarting,
                EventKind::QueueIdle
            ]
        );
    }

    #[tokio::test]
    async fn test_panicking_subscriber_is_reported() {
        let bus = Bus::new(16);
        let mut rx = bus.subscribe();
        let set = SubscriberSet::new(vec![Arc::new(Exploder)], bus, &Handle::current());

        set.emit(&Event::new(EventKind::QueueClosed));
        set.shutdown().await;

        let ev = rx.recv().await.expect("panic event");
        assert_eq!(ev.kind, EventKind::SubscriberPanicked);
        assert_eq!(ev.task.as_deref(), Some("exploder"));
        assert_eq!(ev.reason.as_deref(), Some("exploder always panics"));
    }
}
