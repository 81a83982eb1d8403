//! # Supervisor configuration.
//!
//! [`SupervisorConfig`] is passed explicitly to [`Supervisor::builder`](crate::Supervisor::builder);
//! there is no global state.
//!
//! ## Sentinel values
//! - `bus_capacity = 0` → clamped to 1 by [`SupervisorConfig::bus_capacity_clamped`]

use std::time::Duration;

/// Settings for one supervised run.
///
/// ## Field semantics
/// - `timeout`: how long each runner may take to report done after the scope is cancelled
///   (all runners are waited on in parallel, so this also bounds the whole join)
/// - `bus_capacity`: event bus ring buffer size (min 1)
/// - `signals`: register the built-in [`SignalListener`](crate::SignalListener)
#[derive(Clone, Debug)]
pub struct SupervisorConfig {
    /// Per-runner shutdown wait.
    ///
    /// A runner that is still running after `timeout` is logged as
    /// "took too long to stop" and abandoned; the join does not fail.
    pub timeout: Duration,

    /// Capacity of the event bus broadcast channel ring buffer.
    pub bus_capacity: usize,

    /// Whether SIGINT/SIGTERM/SIGQUIT (or Ctrl-C) fire the shared trigger.
    pub signals: bool,
}

impl SupervisorConfig {
    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for SupervisorConfig {
    /// Default configuration:
    ///
    /// - `timeout = 30s`
    /// - `bus_capacity = 1024`
    /// - `signals = true`
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            bus_capacity: 1024,
            signals: true,
        }
    }
}
