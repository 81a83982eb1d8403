//! # Example: one_shot
//!
//! A single critical job that brings the whole process down when it is done.
//!
//! Demonstrates how to:
//! - Define a simple task using [`TaskFn`].
//! - Fire the shared [`Trigger`] from inside a task.
//! - Run it under [`Supervisor`]; the default `LogWriter` subscriber reports events.
//!
//! ## Flow
//! ```text
//! Supervisor::run()
//!     ├─► launch(SignalListener), launch(Runner::once(migrate))
//!     │     ├─► publish(RunnerStarting)
//!     │     ├─► migrate.execute() ─► trigger.fire()
//!     │     └─► publish(RunnerStopped)
//!     ├─► publish(ShutdownRequested)
//!     └─► join_all(timeout) ─► publish(AllStopped) ─► exit
//! ```
//!
//! ## Run
//! ```bash
//! RUST_LOG=debug cargo run --example one_shot
//! ```

use std::time::Duration;

use procvisor::{Supervisor, SupervisorConfig, TaskError, TaskFn, TaskRef, Trigger};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut cfg = SupervisorConfig::default();
    cfg.timeout = Duration::from_secs(5);

    let migrate: TaskRef = TaskFn::arc("migrate", |ctx: CancellationToken, trigger: Trigger| async move {
        for step in 1..=3 {
            if ctx.is_cancelled() {
                return Err(TaskError::Canceled);
            }
            tracing::info!(step, "applying migration");
            tokio::time::sleep(Duration::from_millis(300)).await;
        }
        trigger.fire();
        Ok(())
    });

    Supervisor::builder(cfg)
        .with_task(migrate)
        .build()?
        .run()
        .await;
    Ok(())
}
