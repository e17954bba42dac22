use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tokio_util::sync::CancellationToken;

use super::{config::QueueConfig, queue::SerialQueue, shared::Shared};
use crate::{
    events::Bus,
    subscribers::{Subscribe, SubscriberSet},
};

/// Builder for constructing a [`SerialQueue`] with optional features.
pub struct QueueBuilder {
    cfg: QueueConfig,
    subscribers: Vec<Arc<dyn Subscribe>>,
    runtime: Option<Handle>,
}

impl QueueBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: QueueConfig) -> Self {
        Self {
            cfg,
            subscribers: Vec::new(),
            runtime: None,
        }
    }

    /// Sets event subscribers for observability.
    ///
    /// Subscribers receive queue events (submissions, slot lifecycle,
    /// timeouts) through dedicated workers with bounded queues.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Runs slot drivers and subscriber workers on `runtime`.
    ///
    /// Without it, [`build`](Self::build) uses the runtime it is called from.
    pub fn with_runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    /// Builds and returns the queue.
    ///
    /// This consumes the builder and initializes:
    /// - Event bus for broadcasting
    /// - Subscriber workers and the bus forwarder (only if subscribers were given)
    ///
    /// # Panics
    /// Panics if no runtime was given and this is called outside a Tokio runtime.
    pub fn build(self) -> SerialQueue {
        let runtime = self.runtime.unwrap_or_else(Handle::current);
        let bus = Bus::new(self.cfg.bus_capacity_clamped());
        let dropped = CancellationToken::new();

        if !self.subscribers.is_empty() {
            let subs = SubscriberSet::new(self.subscribers, bus.clone(), &runtime);
            spawn_forwarder(&runtime, &bus, subs, dropped.clone());
        }

        let shared = Shared::new(self.cfg, bus, runtime, dropped);
        SerialQueue::from_shared(Arc::new(shared))
    }
}

/// Forwards bus events to the subscriber set until the queue is gone.
///
/// Events still buffered when the queue goes away are delivered, then the
/// subscriber workers are drained and joined.
fn spawn_forwarder(runtime: &Handle, bus: &Bus, subs: SubscriberSet, dropped: CancellationToken) {
    let mut rx = bus.subscribe();
    runtime.spawn(async move {
        loop {
            tokio::select! {
                biased;
                res = rx.recv() => match res {
                    Ok(ev) => subs.emit(&ev),
                    Err(RecvError::Lagged(_)) => continue,
                    Err(RecvError::Closed) => break,
                },
                () = dropped.cancelled() => break,
            }
        }
        loop {
            match rx.try_recv() {
                Ok(ev) => subs.emit(&ev),
                Err(TryRecvError::Lagged(_)) => continue,
                Err(TryRecvError::Empty | TryRecvError::Closed) => break,
            }
        }
        subs.shutdown().await;
    });
}
