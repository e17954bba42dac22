//! # Queue configuration.
//!
//! Provides [`QueueConfig`], the settings shared by every slot of one
//! [`SerialQueue`](crate::SerialQueue).
//!
//! ## Zero timeout
//! Unlike a "no timeout" sentinel, `timeout = 0s` is a real deadline: every
//! action still runs to its first suspension point, then the slot times out
//! and the queue moves on while the action continues in the background.

use std::time::Duration;

/// Default per-task timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(3000);

/// Configuration for a serial queue.
///
/// ## Field semantics
/// - `timeout`: per-task deadline after which the queue stops waiting (`0s` = as soon as the task yields)
/// - `bus_capacity`: event bus ring buffer size (min 1; clamped by Bus)
#[derive(Clone, Debug)]
pub struct QueueConfig {
    /// How long the queue waits for one task before skipping ahead.
    ///
    /// The timed-out task is not cancelled; only the queue stops waiting.
    pub timeout: Duration,

    /// Capacity of the event bus broadcast channel ring buffer.
    ///
    /// Slow receivers that lag behind more than `bus_capacity` messages will
    /// receive `Lagged` and skip older items.
    pub bus_capacity: usize,
}

impl QueueConfig {
    /// Default configuration with the timeout given in milliseconds.
    ///
    /// # Example
    /// ```
    /// use serq::QueueConfig;
    /// use std::time::Duration;
    ///
    /// let cfg = QueueConfig::from_millis(200);
    /// assert_eq!(cfg.timeout, Duration::from_millis(200));
    /// ```
    pub fn from_millis(timeout_ms: u64) -> Self {
        Self {
            timeout: Duration::from_millis(timeout_ms),
            ..Self::default()
        }
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for QueueConfig {
    /// Default configuration:
    ///
    /// - `timeout = 3000ms`
    /// - `bus_capacity = 1024`
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            bus_capacity: 1024,
        }
    }
}
