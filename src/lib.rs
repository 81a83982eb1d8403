//! # procvisor
//!
//! **Procvisor** runs the long-lived and periodic units of work of one process under a
//! single cancellation scope, and brings them all down within a bounded time when any
//! of them (or an OS signal) asks for it.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │     Task     │   │ ManagedTask  │   │     Task     │
//!     │    (once)    │   │  (interval)  │   │    (cron)    │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Supervisor                                                       │
//! │  - scope() ─► (CancellationToken, Trigger)  shared by every runner│
//! │  - SignalListener (SIGINT/SIGTERM/SIGQUIT ─► Trigger::fire)       │
//! │  - Bus (broadcast events) ─► SubscriberSet (per-sub queues)       │
//! └──────┬──────────────────┬──────────────────┬──────────────────────┘
//!        ▼                  ▼                  ▼
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │    Runner    │   │    Runner    │   │    Runner    │
//!     │  launch()    │   │  launch()    │   │  launch()    │
//!     └┬─────────────┘   └┬─────────────┘   └┬─────────────┘
//!      │ RunnerStarting   │ RunnerStarting   │ RunnerStarting
//!      │ RunnerStopped    │ RunnerFailed     │ FinalizeFailed ...
//!      ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │                        Bus (broadcast channel)                    │
//! │              (capacity: SupervisorConfig::bus_capacity)           │
//! └─────────────────────────────────┬─────────────────────────────────┘
//!                                   ▼
//!                            SubscriberSet
//!                        ┌─────────┼─────────┐
//!                        ▼         ▼         ▼
//!                    LogWriter   sub2  ...  subN
//! ```
//!
//! ### Shutdown
//! ```text
//! any Trigger::fire() / OS signal / every runner finished
//!   └─► scope cancelled ─► every runner observes it and unwinds
//!         └─► ShutdownRequested
//!               └─► join_all(timeout): wait for each runner's Done, in parallel
//!                     ├─ RunnerJoined
//!                     ├─ ShutdownTimeout ("took too long to stop", runner abandoned)
//!                     └─ AllStopped
//! ```
//!
//! ## Features
//! | Area              | Description                                                   | Key types / traits                         |
//! |-------------------|---------------------------------------------------------------|--------------------------------------------|
//! | **Tasks**         | Simple or managed (initialize/finalize) units of work.        | [`Task`], [`ManagedTask`], [`TaskFn`]      |
//! | **Runners**       | Once, fixed interval or cron schedule.                        | [`Runner`], [`Mode`], [`Schedule`]         |
//! | **Supervision**   | Shared scope, launch, bounded join.                           | [`Supervisor`], [`launch`], [`join_all`]   |
//! | **Subscriber API**| Hook into lifecycle events (logging, metrics, alerts).        | [`Subscribe`], [`LogWriter`]               |
//! | **Errors**        | Typed errors for configuration, tasks and runners.            | [`ConfigError`], [`TaskError`], [`RunnerError`] |
//! | **Promises**      | One-shot background computation with a cached result.        | [`Promise`]                                |
//! | **Configuration** | Shutdown timeout, bus capacity, OS signals.                   | [`SupervisorConfig`]                       |
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//! use tokio_util::sync::CancellationToken;
//! use procvisor::{LogWriter, Subscribe, Supervisor, SupervisorConfig, TaskError, TaskFn, TaskRef, Trigger};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut cfg = SupervisorConfig::default();
//!     cfg.timeout = Duration::from_secs(5);
//!     cfg.signals = false;
//!
//!     let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::default())];
//!
//!     let hello: TaskRef = TaskFn::arc("hello", |_ctx: CancellationToken, trigger: Trigger| async move {
//!         println!("Hello from task!");
//!         trigger.fire();
//!         Ok::<_, TaskError>(())
//!     });
//!     let heartbeat: TaskRef = TaskFn::arc("heartbeat", |_ctx: CancellationToken, _trigger: Trigger| async move {
//!         Ok::<_, TaskError>(())
//!     });
//!
//!     Supervisor::builder(cfg)
//!         .with_subscribers(subs)
//!         .with_task(hello)
//!         .with_interval_task(Duration::from_millis(100), heartbeat)
//!         .build()?
//!         .run()
//!         .await;
//!     Ok(())
//! }
//! ```
mod core;
mod error;
mod events;
mod promise;
mod subscribers;
mod tasks;

// ---- Public re-exports ----

pub use core::{
    Done, Mode, Runner, RunnerHandle, Schedule, Supervisor, SupervisorBuilder, SupervisorConfig,
    Trigger, join_all, launch, scope,
};
pub use error::{AwaitError, ConfigError, RunnerError, TaskError};
pub use events::{Bus, Event, EventKind};
pub use promise::Promise;
pub use subscribers::{LogWriter, Subscribe, SubscriberSet};
pub use tasks::{ManagedTask, ManagedTaskRef, SignalListener, Task, TaskFn, TaskKind, TaskRef};
