//! # LogWriter — events to `tracing` records
//!
//! The built-in subscriber behind the supervisor's log lines. Installing a
//! `tracing` subscriber (formatting, filtering) is left to the application.
//!
//! ## Levels
//! ```text
//! error  runner-failed, finalize-failed
//! warn   shutdown-timeout ("took too long to stop"), subscriber-overflow, subscriber-panicked
//! info   shutdown-requested, all-stopped
//! debug  runner-starting, runner-stopped, runner-joined
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
        let task = e.task.as_deref().unwrap_or("unknown");
        let reason = e.reason.as_deref().unwrap_or("");

        match e.kind {
            EventKind::RunnerFailed => {
                tracing::error!(task, error = reason, "runner ended in error");
            }
            EventKind::FinalizeFailed => {
                tracing::error!(
                    task,
                    error = reason,
                    "error occurred when calling finalize of the task"
                );
            }
            EventKind::ShutdownTimeout => {
                tracing::warn!(task, timeout_ms = e.timeout_ms, "runner took too long to stop");
            }
            EventKind::SubscriberOverflow => {
                tracing::warn!(subscriber = task, reason, "subscriber dropped event");
            }
            EventKind::SubscriberPanicked => {
                tracing::warn!(subscriber = task, info = reason, "subscriber panicked");
            }
            EventKind::ShutdownRequested => {
                tracing::info!("shutdown requested, waiting for runners to stop");
            }
            EventKind::AllStopped => {
                tracing::info!(timeout_ms = e.timeout_ms, "all runners stopped");
            }
            EventKind::RunnerStarting => {
                tracing::debug!(task, "runner starting");
            }
            EventKind::RunnerStopped => {
                tracing::debug!(task, "runner stopped");
            }
            EventKind::RunnerJoined => {
                tracing::debug!(task, "runner has ended");
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
