//! Error types used by the procvisor runtime and tasks.
//!
//! This module defines the error enums of the crate:
//!
//! - [`TaskError`] — errors returned by task hooks (`execute`, `initialize`, `finalize`).
//! - [`ConfigError`] — invalid runner construction, returned before anything is started.
//! - [`RunnerError`] — terminal outcome of a runner that did not stop cleanly.
//! - [`AwaitError`] — failure to obtain the result of a [`Promise`](crate::Promise).
//!
//! Types provide helper methods (`as_label`, `as_message`) for logging/metrics.

use std::fmt::Display;
use std::time::Duration;
use thiserror::Error;

/// # Errors produced by task hooks.
///
/// Returning `Err` from [`Task::execute`](crate::Task::execute) stops the runner loop.
/// [`TaskError::Canceled`] is the exception: it is treated as a graceful stop.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaskError {
    /// The hook failed.
    #[error("task failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// The hook observed cancellation of its scope and gave up.
    #[error("context cancelled")]
    Canceled,
}

impl TaskError {
    /// Builds a [`TaskError::Fail`] from anything printable.
    ///
    /// # Example
    /// ```
    /// use procvisor::TaskError;
    ///
    /// let err = TaskError::fail("connection refused");
    /// assert_eq!(err.to_string(), "task failed: connection refused");
    /// ```
    pub fn fail(error: impl Display) -> Self {
        TaskError::Fail {
            error: error.to_string(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            TaskError::Fail { .. } => "task_failed",
            TaskError::Canceled => "task_canceled",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            TaskError::Fail { error } => format!("error: {error}"),
            TaskError::Canceled => "context cancelled".to_string(),
        }
    }
}

impl From<std::io::Error> for TaskError {
    fn from(err: std::io::Error) -> Self {
        TaskError::fail(err)
    }
}

/// # Errors raised while constructing a runner.
///
/// Returned synchronously; the caller is expected to fail fast before launching anything.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A periodic runner was requested with a zero interval.
    #[error("interval must be greater than zero, got {interval:?}")]
    InvalidInterval {
        /// The rejected interval.
        interval: Duration,
    },

    /// The cron expression could not be parsed.
    #[error("invalid cron schedule {expression:?}: {reason}")]
    InvalidSchedule {
        /// The rejected expression.
        expression: String,
        /// Parser diagnostic.
        reason: String,
    },
}

impl ConfigError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use procvisor::ConfigError;
    /// use std::time::Duration;
    ///
    /// let err = ConfigError::InvalidInterval { interval: Duration::ZERO };
    /// assert_eq!(err.as_label(), "config_invalid_interval");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ConfigError::InvalidInterval { .. } => "config_invalid_interval",
            ConfigError::InvalidSchedule { .. } => "config_invalid_schedule",
        }
    }
}

/// # Terminal outcome of a runner that did not stop cleanly.
///
/// Carries the runner's display name so the launcher can log it without extra context.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RunnerError {
    /// `initialize` failed; `execute` was never called.
    #[error("unable to initialize task {task:?}: {source}")]
    Initialize {
        /// Runner display name.
        task: String,
        /// Error returned by the hook.
        source: TaskError,
    },

    /// `execute` failed; the runner loop stopped.
    #[error("unable to execute task {task:?}: {source}")]
    Execute {
        /// Runner display name.
        task: String,
        /// Error returned by the hook.
        source: TaskError,
    },

    /// `finalize` failed and no earlier error was recorded.
    #[error("unable to finalize task {task:?}: {source}")]
    Finalize {
        /// Runner display name.
        task: String,
        /// Error returned by the hook.
        source: TaskError,
    },

    /// A task hook panicked.
    #[error("task {task:?} panicked: {info}")]
    Panicked {
        /// Runner display name.
        task: String,
        /// Panic payload, when printable.
        info: String,
    },
}

impl RunnerError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            RunnerError::Initialize { .. } => "runner_initialize_failed",
            RunnerError::Execute { .. } => "runner_execute_failed",
            RunnerError::Finalize { .. } => "runner_finalize_failed",
            RunnerError::Panicked { .. } => "runner_panicked",
        }
    }

    /// Name of the runner this error belongs to.
    pub fn task(&self) -> &str {
        match self {
            RunnerError::Initialize { task, .. }
            | RunnerError::Execute { task, .. }
            | RunnerError::Finalize { task, .. }
            | RunnerError::Panicked { task, .. } => task,
        }
    }
}

/// # Errors produced while awaiting a [`Promise`](crate::Promise).
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AwaitError<E> {
    /// The producer finished with an error.
    #[error("{0}")]
    Failed(E),

    /// The awaiting scope was cancelled before the producer finished.
    ///
    /// The producer itself keeps running.
    #[error("await cancelled")]
    Canceled,

    /// The producer terminated (panicked or was aborted) without a result.
    #[error("producer terminated without a result")]
    Lost,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runner_error_exposes_task_name() {
        let err = RunnerError::Execute {
            task: "worker".into(),
            source: TaskError::fail("boom"),
        };
        assert_eq!(err.task(), "worker");
        assert_eq!(err.as_label(), "runner_execute_failed");
        assert_eq!(
            err.to_string(),
            "unable to execute task \"worker\": task failed: boom"
        );
    }

    #[test]
    fn io_errors_become_failures() {
        let io = std::io::Error::other("no signal support");
        let err: TaskError = io.into();
        assert_eq!(err.as_label(), "task_failed");
        assert_eq!(err.as_message(), "error: no signal support");
    }
}
