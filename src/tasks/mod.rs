//! # Task abstractions.
//!
//! This module provides the task-related types:
//! - [`Task`] - simple shape: name + async `execute`
//! - [`ManagedTask`] - full shape: `initialize` / `execute` / `finalize`
//! - [`TaskKind`] - a task tagged with its shape, chosen once at construction
//! - [`TaskFn`] - closure-backed simple task
//! - [`SignalListener`] - fires the shared trigger on OS termination signals

mod signal;
mod task;
mod task_fn;

pub use signal::SignalListener;
pub use task::{ManagedTask, ManagedTaskRef, Task, TaskKind, TaskRef};
pub use task_fn::TaskFn;
