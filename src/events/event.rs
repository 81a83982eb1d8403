//! # Runtime events emitted by runners and the supervisor.
//!
//! The [`EventKind`] enum classifies event types across three categories:
//! - **Runner lifecycle**: starting, stopped, failed, suppressed finalize failure
//! - **Shutdown**: requested, per-runner joined/timeout, all stopped
//! - **Subscriber health**: overflow, panic
//!
//! The [`Event`] struct carries metadata such as timestamps, runner name, reasons and
//! the shutdown timeout.
//!
//! ## Ordering guarantees
//! Subscribers run on independent queues, so two subscribers may observe events in
//! different interleavings. `seq` is process-wide and strictly increasing; sort on it
//! when the publication order matters.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use procvisor::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::ShutdownTimeout)
//!     .with_task("indexer")
//!     .with_timeout(Duration::from_secs(30));
//!
//! assert_eq!(ev.kind, EventKind::ShutdownTimeout);
//! assert_eq!(ev.task.as_deref(), Some("indexer"));
//! assert_eq!(ev.timeout_ms, Some(30_000));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

/// Process-wide event counter backing [`Event::seq`].
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

    // === Runner lifecycle ===
    /// Runner started driving its task.
    ///
    /// Sets:
    /// - `task`: runner name
    RunnerStarting,

    /// Runner finished without error.
    ///
    /// Sets:
    /// - `task`: runner name
    RunnerStopped,

    /// Runner finished with an error (initialize, execute, finalize or panic).
    ///
    /// Sets:
    /// - `task`: runner name
    /// - `reason`: error message
    RunnerFailed,

    /// `finalize` failed after an earlier error already became the runner's outcome.
    ///
    /// Sets:
    /// - `task`: runner name
    /// - `reason`: finalize error message
    FinalizeFailed,

    // === Shutdown ===
    /// The shared scope was cancelled; the supervisor starts joining runners.
    ShutdownRequested,

    /// A runner reported done within the shutdown timeout.
    ///
    /// Sets:
    /// - `task`: runner name
    RunnerJoined,

    /// A runner did not report done within the shutdown timeout.
    ///
    /// Sets:
    /// - `task`: runner name
    /// - `timeout_ms`: the per-runner timeout (ms)
    ShutdownTimeout,

    /// Every runner reported done within the shutdown timeout.
    ///
    /// Sets:
    /// - `timeout_ms`: the per-runner timeout (ms)
    AllStopped,
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Position in the process-wide publication order.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,
    /// Name of the runner (or subscriber), if applicable.
    pub task: Option<Arc<str>>,
    /// Error message, overflow cause or panic payload.
    pub reason: Option<Arc<str>>,
    /// Shutdown timeout in milliseconds (compact).
    pub timeout_ms: Option<u32>,
}

impl Event {
    /// Stamps a new event of `kind` with the next `seq` and the current wall clock.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            task: None,
            reason: None,
            timeout_ms: None,
        }
    }

    /// Sets [`Event::reason`].
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches a runner name.
    #[inline]
    pub fn with_task(mut self, task: impl Into<Arc<str>>) -> Self {
        self.task = Some(task.into());
        self
    }

    /// Sets [`Event::timeout_ms`], saturating at `u32::MAX`.
    #[inline]
    pub fn with_timeout(mut self, d: Duration) -> Self {
        let ms = d.as_millis().min(u128::from(u32::MAX)) as u32;
        self.timeout_ms = Some(ms);
        self
    }

    /// `SubscriberOverflow` for `subscriber`.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_task(subscriber)
            .with_reason(reason)
    }

    /// `SubscriberPanicked` for `subscriber`.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_task(subscriber)
            .with_reason(info)
    }
}
