//! # Subscriber trait.
//!
//! Implement [`Subscribe`] to react to runner and shutdown events: logs, metrics,
//! alerts. The [`SubscriberSet`](crate::SubscriberSet) gives every subscriber its own
//! bounded queue and worker.
//!
//! ## Contract
//! - A slow `on_event` only delays its own queue; publishers and other subscribers
//!   keep going.
//! - When the queue (sized by [`Subscribe::queue_capacity`]) is full, the event is
//!   dropped for this subscriber and `SubscriberOverflow` is published.
//! - A panic in `on_event` is caught and published as `SubscriberPanicked`; the worker
//!   keeps serving later events.

use async_trait::async_trait;

use crate::events::Event;

/// Receives runtime events on a dedicated worker.
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Called once per event, in publication order.
    async fn on_event(&self, event: &Event);

    /// Name reported in overflow and panic events.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Queue length before events start being dropped.
    fn queue_capacity(&self) -> usize {
        1024
    }
}
