//! # Shared queue state and the drain step.
//!
//! [`Shared`] is owned jointly by every [`SerialQueue`](crate::SerialQueue)
//! clone and by every running slot driver. All mutation of the backlog, the
//! status and the slot counter happens under one mutex, in `submit`, `close`
//! and [`Shared::drain`].
//!
//! ## Slot ids
//! `current_id` is bumped once per task that *starts*. Every continuation
//! (task settled, timer fired) carries the slot id it was created for and
//! calls `drain(slot)`; `drain` discards the call unless `slot == current_id`.
//! That comparison is what lets a timed-out action finish in the background
//! without advancing the queue a second time.
//!
//! ```text
//! drain(expected)
//!   ├─ expected != current_id      → stale, return
//!   ├─ status ∉ {Busy, Closed}     → return
//!   ├─ disarm timer
//!   ├─ pop backlog ── none ──► Busy → Idle (Closed stays Closed), publish QueueIdle
//!   └─ slot = ++current_id, arm timer, spawn slot driver
//! ```

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;

use super::config::QueueConfig;
use super::slot::run_slot;
use super::status::QueueStatus;
use crate::events::{Bus, Event, EventKind};
use crate::tasks::TaskRecord;

/// Mutable queue state, only touched under [`Shared::lock`].
pub(crate) struct QueueState {
    pub(crate) status: QueueStatus,
    pub(crate) backlog: VecDeque<TaskRecord>,
    pub(crate) current_id: u64,
    /// Slot whose timer is armed; at most one at a time.
    pub(crate) armed: Option<u64>,
    /// Slot id at which `QueueIdle` was last published.
    last_idle: Option<u64>,
}

pub(crate) struct Shared {
    pub(crate) cfg: QueueConfig,
    pub(crate) bus: Bus,
    pub(crate) runtime: Handle,
    state: Mutex<QueueState>,
    /// Cancelled when the last owner goes away; stops the subscriber forwarder.
    dropped: CancellationToken,
}

impl Shared {
    pub(crate) fn new(cfg: QueueConfig, bus: Bus, runtime: Handle, dropped: CancellationToken) -> Self {
        Self {
            cfg,
            bus,
            runtime,
            state: Mutex::new(QueueState {
                status: QueueStatus::Idle,
                backlog: VecDeque::new(),
                current_id: 0,
                armed: None,
                last_idle: None,
            }),
            dropped,
        }
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Builds and publishes an event while holding the state lock.
    ///
    /// Every queue event takes its `seq` and enters the bus under this lock,
    /// so receivers see them in `seq` order.
    pub(crate) fn publish_locked(&self, build: impl FnOnce() -> Event) {
        let _st = self.lock();
        self.bus.publish(build());
    }

    /// Runs `drain(expected)` as a separate runtime task.
    ///
    /// Submissions made before that task is polled land in the backlog first.
    pub(crate) fn schedule_drain(self: &Arc<Self>, expected: u64) {
        let shared = Arc::clone(self);
        self.runtime.spawn(async move {
            shared.drain(expected);
        });
    }

    /// Pops and starts the next task, or idles the queue.
    pub(crate) fn drain(self: &Arc<Self>, expected: u64) {
        let (slot, record) = {
            let mut st = self.lock();
            if st.current_id != expected || !st.status.is_draining() {
                return;
            }
            st.armed = None;

            let Some(record) = st.backlog.pop_front() else {
                if st.status == QueueStatus::Busy {
                    st.status = QueueStatus::Idle;
                }
                // A late completion on a closed queue lands here a second time.
                if st.last_idle != Some(st.current_id) {
                    st.last_idle = Some(st.current_id);
                    self.bus
                        .publish(Event::new(EventKind::QueueIdle).with_slot(st.current_id));
                }
                return;
            };

            st.current_id += 1;
            let slot = st.current_id;
            st.armed = Some(slot);
            self.bus.publish(
                Event::new(EventKind::TaskStarting)
                    .with_task_opt(record.name.as_ref())
                    .with_slot(slot)
                    .with_timeout(self.cfg.timeout)
                    .with_pending(st.backlog.len()),
            );
            (slot, record)
        };

        self.runtime
            .spawn(run_slot(Arc::clone(self), slot, record));
    }

    /// Disarms the timer of `slot` after its action settled in time.
    ///
    /// Returns `false` if the timer was no longer armed for this slot.
    pub(crate) fn disarm(&self, slot: u64) -> bool {
        let mut st = self.lock();
        if st.armed == Some(slot) {
            st.armed = None;
            true
        } else {
            false
        }
    }

    /// Claims the timeout of `slot`.
    ///
    /// Returns `true` only if `slot` is still the live slot with an armed
    /// timer; the caller then owns advancing the queue.
    pub(crate) fn expire(&self, slot: u64) -> bool {
        let mut st = self.lock();
        if st.current_id != slot || st.armed != Some(slot) {
            return false;
        }
        st.armed = None;
        true
    }
}

impl Drop for Shared {
    fn drop(&mut self) {
        self.dropped.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deferred;
    use crate::tasks::SubmitOptions;

    fn shared() -> Arc<Shared> {
        Arc::new(Shared::new(
            QueueConfig::default(),
            Bus::new(16),
            Handle::current(),
            CancellationToken::new(),
        ))
    }

    fn record() -> TaskRecord {
        let (d, _handle) = deferred::create::<(), String>();
        TaskRecord::new(|_ctx| async { Ok(()) }, d, SubmitOptions::new())
    }

    #[tokio::test]
    async fn test_stale_drain_is_ignored() {
        let s = shared();
        {
            let mut st = s.lock();
            st.status = QueueStatus::Busy;
            st.current_id = 5;
            st.backlog.push_back(record());
        }

        s.drain(4);

        let st = s.lock();
        assert_eq!(st.current_id, 5);
        assert_eq!(st.backlog.len(), 1);
    }

    #[tokio::test]
    async fn test_drain_on_idle_does_nothing() {
        let s = shared();
        s.lock().backlog.push_back(record());

        s.drain(0);

        let st = s.lock();
        assert_eq!(st.current_id, 0);
        assert_eq!(st.status, QueueStatus::Idle);
    }

    #[tokio::test]
    async fn test_drain_assigns_next_slot_and_arms_timer() {
        let s = shared();
        {
            let mut st = s.lock();
            st.status = QueueStatus::Busy;
            st.backlog.push_back(record());
        }

        s.drain(0);

        let st = s.lock();
        assert_eq!(st.current_id, 1);
        assert_eq!(st.armed, Some(1));
        assert!(st.backlog.is_empty());
    }

    #[tokio::test]
    async fn test_empty_backlog_idles_busy_but_not_closed() {
        let s = shared();
        s.lock().status = QueueStatus::Busy;
        s.drain(0);
        assert_eq!(s.lock().status, QueueStatus::Idle);

        s.lock().status = QueueStatus::Closed;
        s.drain(0);
        assert_eq!(s.lock().status, QueueStatus::Closed);
    }

    #[tokio::test]
    async fn test_idle_is_reported_once_per_slot() {
        let s = shared();
        let mut rx = s.bus.subscribe();
        s.lock().status = QueueStatus::Closed;

        s.drain(0);
        s.drain(0);

        assert_eq!(rx.try_recv().map(|e| e.kind), Ok(EventKind::QueueIdle));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_expire_only_once_and_only_for_live_slot() {
        let s = shared();
        {
            let mut st = s.lock();
            st.current_id = 3;
            st.armed = Some(3);
        }
        assert!(!s.expire(2));
        assert!(s.expire(3));
        assert!(!s.expire(3));
        assert!(!s.disarm(3));
    }

    #[tokio::test]
    async fn test_disarm_claims_the_armed_slot_once() {
        let s = shared();
        {
            let mut st = s.lock();
            st.current_id = 2;
            st.armed = Some(2);
        }
        assert!(!s.disarm(1));
        assert!(s.disarm(2));
        assert!(!s.disarm(2));
        assert!(!s.expire(2));
    }
}
