//! # Example: periodic
//!
//! Interval and cron runners side by side, with a managed task that owns a resource.
//!
//! Shows how to:
//! - Implement [`ManagedTask`] (`initialize` / `execute` / `finalize`).
//! - Register interval and cron runners on the builder.
//! - Stop everything with Ctrl-C (or after the deadline task fires the trigger).
//!
//! ## Flow
//! ```text
//! Supervisor::run()
//!     ├─► Runner::every(2s, flusher):  initialize ─► execute ... ─► finalize
//!     ├─► Runner::cron("*/5 * * * * *", reporter)
//!     ├─► Runner::once(deadline): sleep 12s ─► trigger.fire()
//!     └─► ShutdownRequested ─► join_all ─► AllStopped
//! ```
//!
//! ## Run
//! ```bash
//! RUST_LOG=debug cargo run --example periodic
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use procvisor::{
    ManagedTask, Supervisor, SupervisorConfig, Task, TaskError, TaskFn, TaskKind,
    TaskRef, Trigger,
};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Counts flushes; pretends to own a connection.
#[derive(Default)]
struct Flusher {
    flushed: AtomicU64,
}

#[async_trait]
impl Task for Flusher {
    fn name(&self) -> &str {
        "flusher"
    }

    async fn execute(&self, _ctx: CancellationToken, _trigger: Trigger) -> Result<(), TaskError> {
        let n = self.flushed.fetch_add(1, Ordering::Relaxed) + 1;
        tracing::info!(n, "flushed buffer");
        Ok(())
    }
}

#[async_trait]
impl ManagedTask for Flusher {
    async fn initialize(&self) -> Result<(), TaskError> {
        tracing::info!("connection opened");
        Ok(())
    }

    async fn finalize(&self) -> Result<(), TaskError> {
        tracing::info!(total = self.flushed.load(Ordering::Relaxed), "connection closed");
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let reporter: TaskRef = TaskFn::arc("reporter", |_ctx: CancellationToken, _trigger: Trigger| async move {
        tracing::info!("report generated");
        Ok::<_, TaskError>(())
    });

    let deadline: TaskRef = TaskFn::arc("deadline", |ctx: CancellationToken, trigger: Trigger| async move {
        tokio::select! {
            _ = tokio::time::sleep(Duration::from_secs(12)) => trigger.fire(),
            _ = ctx.cancelled() => {}
        }
        Ok::<_, TaskError>(())
    });

    Supervisor::builder(SupervisorConfig::default())
        .with_interval_task(Duration::from_secs(2), TaskKind::managed(Flusher::default()))
        .with_cron_task("*/5 * * * * *", reporter)
        .with_task(deadline)
        .build()?
        .run()
        .await;
    Ok(())
}
