//! # One-shot background computation with a cached result.
//!
//! [`Promise`] starts its producer immediately and lets any number of callers await the
//! single result. Every await after resolution returns a clone of the same value; the
//! producer runs exactly once.
//!
//! [`Promise::wait_with`] stops waiting when the given token is cancelled, but the
//! producer keeps running to completion. Producers that must stop early have to observe
//! a token of their own.
//!
//! [`AwaitError::Failed`] carries only the error. A producer that has a partial value to
//! report on failure should put it inside its error type `E`.
//!
//! ## Example
//! ```rust
//! use procvisor::{AwaitError, Promise};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let answer = Promise::spawn(async { Ok::<_, String>(42) });
//!     // other work...
//!     assert_eq!(answer.wait().await, Ok(42));
//!     assert_eq!(answer.wait().await, Ok(42));
//!
//!     let failed = Promise::<u8, _>::spawn(async { Err("no luck".to_string()) });
//!     assert_eq!(failed.wait().await, Err(AwaitError::Failed("no luck".to_string())));
//! }
//! ```

use std::future::Future;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::error::AwaitError;

/// Handle to a single in-flight or finished computation.
///
/// Cheap to clone; clones share the same result.
#[derive(Clone, Debug)]
pub struct Promise<T, E> {
    rx: watch::Receiver<Option<Result<T, E>>>,
}

impl<T, E> Promise<T, E>
where
    T: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    /// Spawns `fut` on the current tokio runtime.
    pub fn spawn<F>(fut: F) -> Self
    where
        F: Future<Output = Result<T, E>> + Send + 'static,
    {
        let (tx, rx) = watch::channel(None);
        tokio::spawn(async move {
            let res = fut.await;
            let _ = tx.send(Some(res));
        });
        Self { rx }
    }

    /// Runs `f` on the blocking thread pool.
    pub fn spawn_blocking<F>(f: F) -> Self
    where
        F: FnOnce() -> Result<T, E> + Send + 'static,
    {
        let (tx, rx) = watch::channel(None);
        tokio::task::spawn_blocking(move || {
            let _ = tx.send(Some(f()));
        });
        Self { rx }
    }

    /// True once the producer has stored its result.
    pub fn is_ready(&self) -> bool {
        self.rx.borrow().is_some()
    }

    /// Waits for the result.
    ///
    /// Returns [`AwaitError::Lost`] if the producer panicked or was aborted.
    pub async fn wait(&self) -> Result<T, AwaitError<E>> {
        let mut rx = self.rx.clone();
        let resolved = match rx.wait_for(Option::is_some).await {
            Ok(resolved) => resolved,
            Err(_) => return Err(AwaitError::Lost),
        };

        match resolved.as_ref() {
            Some(Ok(value)) => Ok(value.clone()),
            Some(Err(e)) => Err(AwaitError::Failed(e.clone())),
            None => Err(AwaitError::Lost),
        }
    }

    /// Waits for the result or for `ctx` to be cancelled, whichever comes first.
    ///
    /// An already available result wins over a cancelled `ctx`.
    pub async fn wait_with(&self, ctx: &CancellationToken) -> Result<T, AwaitError<E>> {
        tokio::select! {
            biased;
            res = self.wait() => res,
            _ = ctx.cancelled() => Err(AwaitError::Canceled),
        }
    }
}
