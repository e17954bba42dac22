#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use serq::{Event, EventKind};
use tokio::sync::broadcast;

/// Shared, ordered record of side effects.
#[derive(Clone, Default)]
pub struct Trace(Arc<Mutex<Vec<&'static str>>>);

impl Trace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, mark: &'static str) {
        self.0.lock().unwrap().push(mark);
    }

    pub fn snapshot(&self) -> Vec<&'static str> {
        self.0.lock().unwrap().clone()
    }
}

/// Waits until an event of `kind` shows up on `rx`, collecting everything seen.
pub async fn wait_for(rx: &mut broadcast::Receiver<Event>, kind: EventKind) -> Vec<Event> {
    let mut seen = Vec::new();
    tokio::time::timeout(Duration::from_secs(30), async {
        loop {
            let ev = rx.recv().await.expect("bus closed");
            let done = ev.kind == kind;
            seen.push(ev);
            if done {
                break;
            }
        }
    })
    .await
    .expect("event did not arrive");
    seen
}

pub fn kinds(events: &[Event]) -> Vec<EventKind> {
    events.iter().map(|e| e.kind).collect()
}
