use std::sync::Arc;
use std::time::Duration;

use crate::core::config::SupervisorConfig;
use crate::core::runner::Runner;
use crate::core::supervisor::Supervisor;
use crate::error::ConfigError;
use crate::subscribers::{LogWriter, Subscribe};
use crate::tasks::TaskKind;

/// Registration of one runner, validated in [`SupervisorBuilder::build`].
enum Pending {
    Once(TaskKind),
    Interval(Duration, TaskKind),
    Cron(String, TaskKind),
    Ready(Runner),
}

/// Builder for constructing a [`Supervisor`] with its runners and subscribers.
///
/// Runners are launched in the order they are registered.
pub struct SupervisorBuilder {
    cfg: SupervisorConfig,
    subscribers: Vec<Arc<dyn Subscribe>>,
    pending: Vec<Pending>,
}

impl SupervisorBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: SupervisorConfig) -> Self {
        Self {
            cfg,
            subscribers: vec![Arc::new(LogWriter::new())],
            pending: Vec::new(),
        }
    }

    /// Sets event subscribers for observability.
    ///
    /// Subscribers receive runtime events (runner lifecycle, failures, shutdown)
    /// through dedicated workers with bounded queues. Replaces the default set, which
    /// is a single [`LogWriter`]; include one explicitly to keep the log lines.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Registers a task executed once.
    pub fn with_task(mut self, task: impl Into<TaskKind>) -> Self {
        self.pending.push(Pending::Once(task.into()));
        self
    }

    /// Registers a task executed immediately and then every `interval`.
    pub fn with_interval_task(mut self, interval: Duration, task: impl Into<TaskKind>) -> Self {
        self.pending.push(Pending::Interval(interval, task.into()));
        self
    }

    /// Registers a task executed at every occurrence of the cron `expression` (UTC).
    pub fn with_cron_task(mut self, expression: impl Into<String>, task: impl Into<TaskKind>) -> Self {
        self.pending.push(Pending::Cron(expression.into(), task.into()));
        self
    }

    /// Registers an already constructed runner.
    pub fn with_runner(mut self, runner: Runner) -> Self {
        self.pending.push(Pending::Ready(runner));
        self
    }

    /// Builds every runner and returns the Supervisor instance.
    ///
    /// The first configuration error (zero interval, invalid cron expression) is
    /// returned and nothing is started.
    pub fn build(self) -> Result<Supervisor, ConfigError> {
        let runners = self
            .pending
            .into_iter()
            .map(|pending| match pending {
                Pending::Once(task) => Ok(Runner::once(task)),
                Pending::Interval(interval, task) => Runner::every(task, interval),
                Pending::Cron(expression, task) => Runner::cron(task, &expression),
                Pending::Ready(runner) => Ok(runner),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Supervisor::new_internal(self.cfg, self.subscribers, runners))
    }
}
