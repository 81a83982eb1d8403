//! # Runtime event bus.
//!
//! [`Bus`] hands events from runners, `launch` and `join_all` to the supervisor's
//! listener over a [`tokio::sync::broadcast`] channel.
//!
//! ```text
//!   Runner 1 ──┐
//!   Runner 2 ──┼──► Bus ──► supervisor listener ──► SubscriberSet
//!   launch   ──┤
//!   join_all ──┘
//! ```
//!
//! ## Behaviour
//! - `publish()` returns immediately, whether or not anyone listens.
//! - One ring buffer of `capacity` events is shared by all receivers.
//! - A receiver that falls more than `capacity` events behind gets `Lagged(n)`
//!   and loses the `n` oldest events.
//! - Nothing is stored for receivers created later.

use tokio::sync::broadcast;

use super::event::Event;

/// Cloneable publishing handle shared by every runner.
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
}

impl Bus {
    /// Creates a new bus with the given channel capacity (clamped to at least 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (tx, _rx) = broadcast::channel::<Event>(capacity);
        Self { tx }
    }

    /// Sends `ev` to every current receiver; dropped silently when there are none.
    pub fn publish(&self, ev: Event) {
        let _ = self.tx.send(ev);
    }

    /// New receiver for events published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;

    #[tokio::test]
    async fn receivers_only_see_events_after_subscribing() {
        let bus = Bus::new(0);
        bus.publish(Event::new(EventKind::RunnerStarting));

        let mut rx = bus.subscribe();
        bus.publish(Event::new(EventKind::RunnerStopped).with_task("a"));

        let ev = rx.recv().await.unwrap();
        assert_eq!(ev.kind, EventKind::RunnerStopped);
        assert!(rx.try_recv().is_err());
    }
}
