//! # Shared cancellation scope and completion signals.
//!
//! One process run owns exactly one root [`CancellationToken`] (the *scope*) and one
//! [`Trigger`] that fires it. Both are passed explicitly to every runner and every task
//! invocation; there is no ambient/global state.
//!
//! ```text
//! scope() ──► (root token, Trigger)
//!                 │            │
//!                 │            └─► any task may fire() ─► root cancelled (monotonic)
//!                 ▼
//!      runner A ── child token (managed tasks only)
//!      runner B ── root token
//! ```
//!
//! [`Done`] is the runner's single-assignment completion signal. Completing it is
//! idempotent by construction, and [`Done::guard`] ties completion to a scope exit so
//! every return path (including unwinding) reports done exactly once.

use tokio_util::sync::{CancellationToken, DropGuard};

/// Creates a fresh shared cancellation scope and the trigger that fires it.
///
/// # Example
/// ```
/// let (scope, trigger) = procvisor::scope();
/// assert!(!scope.is_cancelled());
/// trigger.fire();
/// trigger.fire(); // idempotent
/// assert!(scope.is_cancelled());
/// ```
pub fn scope() -> (CancellationToken, Trigger) {
    let root = CancellationToken::new();
    let trigger = Trigger::new(root.clone());
    (root, trigger)
}

/// Fires the shared cancellation scope.
///
/// Cheap to clone. Firing is idempotent and irreversible; calling it from a task is how
/// that task escalates to "stop the entire process".
#[derive(Clone, Debug)]
pub struct Trigger {
    root: CancellationToken,
}

impl Trigger {
    /// Wraps the root token of a scope.
    pub fn new(root: CancellationToken) -> Self {
        Self { root }
    }

    /// Cancels the whole scope.
    pub fn fire(&self) {
        self.root.cancel();
    }

    /// Returns `true` once the scope has been cancelled (by this trigger or otherwise).
    pub fn is_fired(&self) -> bool {
        self.root.is_cancelled()
    }
}

/// One-shot broadcast "runner has fully stopped" signal.
#[derive(Clone, Debug, Default)]
pub struct Done {
    token: CancellationToken,
}

impl Done {
    /// Creates an incomplete signal.
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the signal complete. Later calls are no-ops.
    pub fn complete(&self) {
        self.token.cancel();
    }

    /// Returns `true` once completed.
    pub fn is_complete(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Waits until the signal is completed. Returns immediately if it already is.
    pub async fn wait(&self) {
        self.token.cancelled().await;
    }

    /// Returns a guard that completes the signal when dropped.
    pub fn guard(&self) -> DropGuard {
        self.token.clone().drop_guard()
    }
}
