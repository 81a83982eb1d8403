//! # OS signal listener task.
//!
//! [`SignalListener`] is an ordinary simple [`Task`]: the supervisor registers it like
//! any other runner. When a termination signal arrives it fires the shared
//! [`Trigger`], which is what brings the whole process down.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::core::{Trigger, shutdown};
use crate::error::TaskError;
use crate::tasks::task::Task;

/// Fires the shared trigger on SIGINT/SIGTERM/SIGQUIT (Ctrl-C on non-Unix).
#[derive(Debug, Default, Clone, Copy)]
pub struct SignalListener;

impl SignalListener {
    /// Construct a new [`SignalListener`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Task for SignalListener {
    fn name(&self) -> &str {
        "signal listener"
    }

    async fn execute(&self, ctx: CancellationToken, trigger: Trigger) -> Result<(), TaskError> {
        tokio::select! {
            res = shutdown::wait_for_shutdown_signal() => {
                let signal = res?;
                tracing::info!(signal, "signal received");
                trigger.fire();
            }
            _ = ctx.cancelled() => {
                tracing::debug!(task = self.name(), "task has been canceled");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn returns_on_cancellation_without_firing() {
        let (scope, trigger) = crate::scope();
        let ctx = scope.child_token();
        ctx.cancel();

        let res = SignalListener::new().execute(ctx, trigger.clone()).await;
        assert!(res.is_ok());
        assert!(!trigger.is_fired());
        assert!(!scope.is_cancelled());
    }
}
