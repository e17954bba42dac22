//! # Slot driver: run one task against its timer.
//!
//! One driver task per started slot. It races the action against the slot
//! timer and advances the queue exactly once:
//!
//! ```text
//! run_slot(slot)
//!   select! (biased: action polled first)
//!     ├─ action settled ─► disarm, publish TaskSettled/TaskFailed
//!     │                    yield, drain(slot)
//!     └─ timer fired ────► expire(slot)?
//!                            ├─ yes: [cancel token], on_timeout(), publish TimeoutHit
//!                            │       schedule drain(slot)
//!                            └─ no : nothing (queue already moved on)
//!                          keep awaiting the action in the background
//!                          publish LateSettled, yield, drain(slot)   ← stale unless the
//!                                                                      queue idled at `slot`
//! ```
//!
//! ## Rules
//! - The action is always polled before the timer, so even a zero timeout lets
//!   it reach its first suspension point.
//! - A timeout never drops the action future; the handle always settles with
//!   the action's real outcome.
//! - The handle is settled before the queue advances.
//! - Events are published under the state lock, so their `seq` order is the
//!   order subscribers receive them in.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use tokio::time;
use tokio_util::sync::CancellationToken;

use super::shared::Shared;
use crate::events::{Event, EventKind};
use crate::tasks::{Settlement, StartedRecord, TaskRecord, panic_message};

/// Drives the task that owns `slot` to completion.
pub(crate) async fn run_slot(shared: Arc<Shared>, slot: u64, record: TaskRecord) {
    let ctx = CancellationToken::new();
    let (meta, mut action) = record.start(ctx.clone());
    let timeout = shared.cfg.timeout;

    let settled = {
        let timer = time::sleep(timeout);
        tokio::pin!(timer);
        tokio::select! {
            biased;
            settlement = &mut action => Some(settlement),
            () = &mut timer => None,
        }
    };

    let StartedRecord {
        name,
        on_timeout,
        cancel_on_timeout,
    } = meta;

    if let Some(settlement) = settled {
        let was_armed = shared.disarm(slot);
        debug_assert!(was_armed, "live slot {slot} settled without an armed timer");
        publish_settled(&shared, slot, name.as_ref(), &settlement, false);
        tokio::task::yield_now().await;
        shared.drain(slot);
        return;
    }

    if shared.expire(slot) {
        if cancel_on_timeout {
            ctx.cancel();
        }
        let panicked = on_timeout.and_then(|cb| {
            std::panic::catch_unwind(AssertUnwindSafe(cb))
                .err()
                .map(|panic_err| format!("on_timeout panicked: {}", panic_message(&*panic_err)))
        });
        shared.publish_locked(|| {
            let ev = Event::new(EventKind::TimeoutHit)
                .with_task_opt(name.as_ref())
                .with_slot(slot)
                .with_timeout(timeout);
            match panicked {
                Some(reason) => ev.with_reason(reason),
                None => ev,
            }
        });
        shared.schedule_drain(slot);
    }

    // Abandoned: the queue no longer waits, the action keeps running here.
    let settlement = action.await;
    publish_settled(&shared, slot, name.as_ref(), &settlement, true);
    tokio::task::yield_now().await;
    shared.drain(slot);
}

fn publish_settled(
    shared: &Shared,
    slot: u64,
    name: Option<&Arc<str>>,
    settlement: &Settlement,
    late: bool,
) {
    let kind = match (late, settlement) {
        (true, _) => EventKind::LateSettled,
        (false, Settlement::Settled) => EventKind::TaskSettled,
        (false, Settlement::Failed(_)) => EventKind::TaskFailed,
    };
    shared.publish_locked(|| {
        let ev = Event::new(kind).with_task_opt(name).with_slot(slot);
        match settlement {
            Settlement::Failed(reason) => ev.with_reason(reason.as_str()),
            Settlement::Settled => ev,
        }
    });
}
