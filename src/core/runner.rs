//! # Runner: drives one task's lifecycle.
//!
//! A [`Runner`] owns one [`TaskKind`], an execution [`Mode`] and a [`Done`] signal.
//! It is created once, started once ([`Runner::start`] consumes it) and reports done
//! exactly once.
//!
//! ## Lifecycle
//! ```text
//! created ──► initializing ──► running(once | interval | cron) ──► finalizing ──► done
//!             (managed only)                                        (managed only)
//!
//! start(scope, trigger):
//!   ├─► managed: child = scope.child_token(); initialize()
//!   │            └─ Err ─► skip running, outcome = Initialize error
//!   ├─► once:     execute()
//!   ├─► interval: execute(); loop { tick(Δ) → execute() | scope cancelled → stop }
//!   ├─► cron:     loop { sleep until next occurrence → execute() | scope cancelled → stop }
//!   ├─► managed: child.cancel(); finalize()
//!   │            └─ Err ─► outcome if none yet, else publish FinalizeFailed
//!   └─► done (drop guard, every exit path)
//! ```
//!
//! ## Rules
//! - `execute` is never re-entered concurrently for one runner.
//! - The first interval execution happens immediately; the first tick is `Δ` after it returns.
//! - The first cron execution happens at the first occurrence after start, not immediately.
//! - An `execute` error stops the loop; it is **not** retried and does **not** cancel the scope.
//! - `Err(TaskError::Canceled)` from `execute` is a graceful stop.

use std::time::Duration;

use chrono::Utc;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::core::schedule::Schedule;
use crate::core::scope::{Done, Trigger};
use crate::error::{ConfigError, RunnerError, TaskError};
use crate::events::{Bus, Event, EventKind};
use crate::tasks::{Task, TaskKind};

/// How often a runner executes its task.
#[derive(Clone, Debug)]
pub enum Mode {
    /// Execute once.
    Once,
    /// Execute once immediately, then every interval until cancelled.
    Interval(Duration),
    /// Execute at every schedule occurrence until cancelled.
    Cron(Schedule),
}

/// Cloneable view of a runner used to join on it after launch.
#[derive(Clone, Debug)]
pub struct RunnerHandle {
    name: String,
    done: Done,
}

impl RunnerHandle {
    /// Runner display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Completion signal of the runner.
    pub fn done(&self) -> &Done {
        &self.done
    }
}

/// Drives one task once, on a fixed interval, or on a cron schedule.
#[derive(Debug)]
pub struct Runner {
    name: String,
    task: TaskKind,
    mode: Mode,
    done: Done,
}

impl Runner {
    /// Runner that executes `task` once.
    pub fn once(task: impl Into<TaskKind>) -> Self {
        Self::with_mode(task.into(), Mode::Once)
    }

    /// Runner that executes `task` immediately and then every `interval`.
    ///
    /// Returns [`ConfigError::InvalidInterval`] for a zero interval; nothing is started.
    pub fn every(task: impl Into<TaskKind>, interval: Duration) -> Result<Self, ConfigError> {
        if interval.is_zero() {
            return Err(ConfigError::InvalidInterval { interval });
        }
        Ok(Self::with_mode(task.into(), Mode::Interval(interval)))
    }

    /// Runner that executes `task` at every occurrence of the cron `expression`.
    ///
    /// The expression is parsed eagerly; an invalid one is returned as
    /// [`ConfigError::InvalidSchedule`] before the task is touched.
    pub fn cron(task: impl Into<TaskKind>, expression: &str) -> Result<Self, ConfigError> {
        let schedule = Schedule::parse(expression)?;
        Ok(Self::with_mode(task.into(), Mode::Cron(schedule)))
    }

    fn with_mode(task: TaskKind, mode: Mode) -> Self {
        Self {
            name: task.name().to_string(),
            task,
            mode,
            done: Done::new(),
        }
    }

    /// Runner display name (the task's name).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Execution mode.
    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    /// Handle to join on this runner once it has been started.
    pub fn handle(&self) -> RunnerHandle {
        RunnerHandle {
            name: self.name.clone(),
            done: self.done.clone(),
        }
    }

    /// Runs the task lifecycle to completion.
    ///
    /// ### Cancellation semantics
    /// - Simple tasks receive `scope` itself.
    /// - Managed tasks receive a child of `scope`, cancelled right before `finalize`,
    ///   so sub-work they spawned stops without touching sibling runners.
    /// - The periodic loops stop cleanly (no error) once `scope` is cancelled.
    ///
    /// ### Outcome
    /// The first error wins: `initialize`, then `execute`, then `finalize`. A `finalize`
    /// error that loses to an earlier one is published as [`EventKind::FinalizeFailed`].
    pub async fn start(
        self,
        scope: CancellationToken,
        trigger: Trigger,
        bus: Bus,
    ) -> Result<(), RunnerError> {
        let _done = self.done.guard();
        self.run_lifecycle(scope, trigger, bus).await
    }

    /// [`Runner::start`] without completing `done`; the caller holds the guard.
    pub(crate) async fn run_lifecycle(
        self,
        scope: CancellationToken,
        trigger: Trigger,
        bus: Bus,
    ) -> Result<(), RunnerError> {
        let Runner {
            name, task, mode, ..
        } = self;

        bus.publish(Event::new(EventKind::RunnerStarting).with_task(name.as_str()));

        match task {
            TaskKind::Simple(task) => drive(task.as_ref(), &mode, &scope, &trigger)
                .await
                .map_err(|source| RunnerError::Execute {
                    task: name.clone(),
                    source,
                }),
            TaskKind::Managed(task) => {
                let child = scope.child_token();

                let outcome = match task.initialize().await {
                    Err(source) => Err(RunnerError::Initialize {
                        task: name.clone(),
                        source,
                    }),
                    Ok(()) => drive(task.as_ref(), &mode, &child, &trigger)
                        .await
                        .map_err(|source| RunnerError::Execute {
                            task: name.clone(),
                            source,
                        }),
                };

                child.cancel();
                match (task.finalize().await, outcome) {
                    (Ok(()), outcome) => outcome,
                    (Err(source), Ok(())) => Err(RunnerError::Finalize {
                        task: name.clone(),
                        source,
                    }),
                    (Err(source), Err(first)) => {
                        bus.publish(
                            Event::new(EventKind::FinalizeFailed)
                                .with_task(name.as_str())
                                .with_reason(source.to_string()),
                        );
                        Err(first)
                    }
                }
            }
        }
    }
}

/// Runs the execution mode against `ctx`.
async fn drive<T: Task + ?Sized>(
    task: &T,
    mode: &Mode,
    ctx: &CancellationToken,
    trigger: &Trigger,
) -> Result<(), TaskError> {
    match mode {
        Mode::Once => execute(task, ctx, trigger).await,
        Mode::Interval(interval) => {
            execute(task, ctx, trigger).await?;
            tick(task, *interval, ctx, trigger).await
        }
        Mode::Cron(schedule) => cron(task, schedule, ctx, trigger).await,
    }
}

/// One `execute` call; `Canceled` counts as a graceful stop.
async fn execute<T: Task + ?Sized>(
    task: &T,
    ctx: &CancellationToken,
    trigger: &Trigger,
) -> Result<(), TaskError> {
    match task.execute(ctx.clone(), trigger.clone()).await {
        Err(TaskError::Canceled) => Ok(()),
        res => res,
    }
}

async fn tick<T: Task + ?Sized>(
    task: &T,
    interval: Duration,
    ctx: &CancellationToken,
    trigger: &Trigger,
) -> Result<(), TaskError> {
    let mut ticker = time::interval_at(Instant::now() + interval, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;
            _ = ctx.cancelled() => {
                tracing::debug!(task = task.name(), "task has been canceled");
                return Ok(());
            }
            _ = ticker.tick() => {
                if ctx.is_cancelled() {
                    continue;
                }
                execute(task, ctx, trigger).await?;
            }
        }
    }
}

async fn cron<T: Task + ?Sized>(
    task: &T,
    schedule: &Schedule,
    ctx: &CancellationToken,
    trigger: &Trigger,
) -> Result<(), TaskError> {
    let mut next = schedule.next_after(&Utc::now());

    while let Some(fire_at) = next {
        let delay = (fire_at - Utc::now()).to_std().unwrap_or(Duration::ZERO);
        let sleep = time::sleep(delay);
        tokio::pin!(sleep);

        tokio::select! {
            biased;
            _ = ctx.cancelled() => {
                tracing::debug!(task = task.name(), "task has been canceled");
                return Ok(());
            }
            _ = &mut sleep => {}
        }

        // the monotonic timer may wake marginally before the wall clock reaches `fire_at`
        let fired_at = Utc::now().max(fire_at);
        execute(task, ctx, trigger).await?;
        next = schedule.next_fire(&fired_at, &Utc::now());
    }

    tracing::debug!(
        task = task.name(),
        schedule = schedule.expression(),
        "schedule has no further occurrence"
    );
    Ok(())
}
