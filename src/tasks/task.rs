//! # Task capability shapes.
//!
//! Two shapes are supported:
//! - [`Task`]: a display name and an async [`execute`](Task::execute) hook;
//! - [`ManagedTask`]: a [`Task`] that also owns a resource, set up once by
//!   [`initialize`](ManagedTask::initialize) and torn down once by
//!   [`finalize`](ManagedTask::finalize).
//!
//! The runner decides which shape it drives once, at construction, through the tagged
//! [`TaskKind`]; the shape never changes for the task's lifetime.

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::core::Trigger;
use crate::error::TaskError;

/// Shared handle to a simple task.
pub type TaskRef = Arc<dyn Task>;

/// Shared handle to a managed task.
pub type ManagedTaskRef = Arc<dyn ManagedTask>;

/// # Asynchronous, cancelable unit of work.
///
/// `execute` may be called once or many times (periodic runners). A task meant to run
/// indefinitely must return promptly once `ctx` is cancelled.
///
/// `trigger` cancels the **whole process**. Reserve it for tasks whose end is fatal to
/// the system (signal listener, critical server).
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use tokio_util::sync::CancellationToken;
/// use procvisor::{Task, TaskError, Trigger};
///
/// struct Heartbeat;
///
/// #[async_trait]
/// impl Task for Heartbeat {
///     fn name(&self) -> &str { "heartbeat" }
///
///     async fn execute(&self, ctx: CancellationToken, _trigger: Trigger) -> Result<(), TaskError> {
///         if ctx.is_cancelled() {
///             return Err(TaskError::Canceled);
///         }
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Task: Send + Sync + 'static {
    /// Returns a stable, human-readable name used in logs.
    fn name(&self) -> &str;

    /// Runs the task once.
    async fn execute(&self, ctx: CancellationToken, trigger: Trigger) -> Result<(), TaskError>;
}

/// # Task owning a resource with an explicit lifecycle.
///
/// - `initialize` runs once before the first `execute`; an error aborts the runner.
/// - `finalize` runs once after the last `execute`, on every exit path, after the
///   task's own child scope has been cancelled.
#[async_trait]
pub trait ManagedTask: Task {
    /// Sets up the resource.
    async fn initialize(&self) -> Result<(), TaskError>;

    /// Releases the resource. Errors are reported, they never cancel the shared scope.
    async fn finalize(&self) -> Result<(), TaskError>;
}

/// A task tagged with its capability shape.
#[derive(Clone)]
pub enum TaskKind {
    /// Execute only.
    Simple(TaskRef),
    /// Initialize, execute, finalize.
    Managed(ManagedTaskRef),
}

impl TaskKind {
    /// Tags `task` as a simple task.
    pub fn simple(task: impl Task) -> Self {
        TaskKind::Simple(Arc::new(task))
    }

    /// Tags `task` as a managed task.
    pub fn managed(task: impl ManagedTask) -> Self {
        TaskKind::Managed(Arc::new(task))
    }

    /// Display name of the wrapped task.
    pub fn name(&self) -> &str {
        match self {
            TaskKind::Simple(t) => t.name(),
            TaskKind::Managed(t) => t.name(),
        }
    }

    /// Returns `true` for [`TaskKind::Managed`].
    pub fn is_managed(&self) -> bool {
        matches!(self, TaskKind::Managed(_))
    }
}

impl std::fmt::Debug for TaskKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskKind::Simple(t) => f.debug_tuple("Simple").field(&t.name()).finish(),
            TaskKind::Managed(t) => f.debug_tuple("Managed").field(&t.name()).finish(),
        }
    }
}

impl From<TaskRef> for TaskKind {
    fn from(task: TaskRef) -> Self {
        TaskKind::Simple(task)
    }
}

impl From<ManagedTaskRef> for TaskKind {
    fn from(task: ManagedTaskRef) -> Self {
        TaskKind::Managed(task)
    }
}
