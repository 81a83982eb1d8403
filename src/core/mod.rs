//! Runtime core: runners, scope and orchestration.
//!
//! Internal modules:
//! - `scope`: shared cancellation scope, [`Trigger`] and the [`Done`] signal;
//! - `runner`: drives one task once, on an interval or on a cron schedule;
//! - `schedule`: cron expression parsing and occurrence math;
//! - `supervisor`: `launch`/`join_all` and the [`Supervisor`] run loop;
//! - `builder`: assembles runners and subscribers into a [`Supervisor`];
//! - `config`: [`SupervisorConfig`];
//! - `shutdown`: cross-platform shutdown signal handling.

mod builder;
mod config;
mod runner;
mod schedule;
mod scope;
pub(crate) mod shutdown;
mod supervisor;

pub use builder::SupervisorBuilder;
pub use config::SupervisorConfig;
pub use runner::{Mode, Runner, RunnerHandle};
pub use schedule::Schedule;
pub use scope::{Done, Trigger, scope};
pub use supervisor::{Supervisor, join_all, launch};
