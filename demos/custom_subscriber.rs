//! # Example: custom_subscriber
//!
//! Demonstrates how to build and attach a custom event subscriber.
//!
//! Shows how to:
//! - Implement the [`Subscribe`] trait.
//! - Inspect [`Event`] / [`EventKind`] for runner lifecycle and shutdown.
//! - Observe a runner that overruns the shutdown timeout.
//!
//! ## Flow
//! ```text
//! Supervisor::run()
//!     ├─► launch(flaky)    ─► publish(RunnerFailed)
//!     ├─► launch(stubborn) ─► ignores cancellation
//!     ├─► launch(quitter)  ─► trigger.fire() after 1s
//!     └─► join_all(2s)
//!           ├─► publish(RunnerJoined)    for flaky, quitter
//!           └─► publish(ShutdownTimeout) for stubborn
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example custom_subscriber
//! ```

use std::{sync::Arc, time::Duration};

use procvisor::{
    Event, EventKind, Subscribe, Supervisor, SupervisorConfig, TaskError, TaskFn, TaskRef, Trigger,
};
use tokio_util::sync::CancellationToken;

/// A simple console subscriber that prints selected events.
struct ConsoleSubscriber;

#[async_trait::async_trait]
impl Subscribe for ConsoleSubscriber {
    async fn on_event(&self, ev: &Event) {
        let task = ev.task.as_deref().unwrap_or("<unknown>");
        match ev.kind {
            EventKind::RunnerStarting => println!("[sub] starting: task={task}"),
            EventKind::RunnerStopped => println!("[sub] stopped:  task={task}"),
            EventKind::RunnerFailed => println!(
                "[sub] failed:   task={task} reason={}",
                ev.reason.as_deref().unwrap_or("<none>")
            ),
            EventKind::ShutdownRequested => println!("[sub] shutdown requested"),
            EventKind::RunnerJoined => println!("[sub] joined:   task={task}"),
            EventKind::ShutdownTimeout => println!(
                "[sub] took too long to stop: task={task} timeout={}ms",
                ev.timeout_ms.unwrap_or_default()
            ),
            EventKind::AllStopped => println!("[sub] all stopped"),
            _ => {}
        }
    }

    fn name(&self) -> &'static str {
        "console"
    }

    fn queue_capacity(&self) -> usize {
        256
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut cfg = SupervisorConfig::default();
    cfg.timeout = Duration::from_secs(2);
    cfg.signals = false;

    let flaky: TaskRef = TaskFn::arc("flaky", |_ctx: CancellationToken, _trigger: Trigger| async {
        Err::<(), _>(TaskError::fail("upstream unavailable"))
    });

    let stubborn: TaskRef = TaskFn::arc("stubborn", |_ctx: CancellationToken, _trigger: Trigger| async {
        tokio::time::sleep(Duration::from_secs(60)).await;
        Ok::<_, TaskError>(())
    });

    let quitter: TaskRef = TaskFn::arc("quitter", |_ctx: CancellationToken, trigger: Trigger| async move {
        tokio::time::sleep(Duration::from_secs(1)).await;
        trigger.fire();
        Ok::<_, TaskError>(())
    });

    Supervisor::builder(cfg)
        .with_subscribers(vec![Arc::new(ConsoleSubscriber)])
        .with_task(flaky)
        .with_task(stubborn)
        .with_task(quitter)
        .build()?
        .run()
        .await;
    Ok(())
}
