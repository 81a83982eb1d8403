//! # Event subscribers.
//!
//! This module provides the [`Subscribe`] trait, the [`SubscriberSet`] fan-out and the
//! built-in [`LogWriter`] for handling runtime events broadcast through the
//! [`Bus`](crate::Bus).
//!
//! ## Architecture
//! ```text
//! Runner/launch/join_all ── publish(Event) ──► Bus ──► supervisor listener
//!                                                           │
//!                                                    SubscriberSet::emit(&Event)
//!                                                  ┌─────────┼─────────┐
//!                                                  ▼         ▼         ▼
//!                                              LogWriter  Metrics   Custom ...
//! ```
//!
//! ## Implementing custom subscribers
//! ```no_run
//! use procvisor::{Event, EventKind, Subscribe};
//! use async_trait::async_trait;
//!
//! struct SlowShutdownAlert;
//!
//! #[async_trait]
//! impl Subscribe for SlowShutdownAlert {
//!     async fn on_event(&self, event: &Event) {
//!         if event.kind == EventKind::ShutdownTimeout {
//!             // page someone
//!         }
//!     }
//!
//!     fn name(&self) -> &'static str { "slow-shutdown-alert" }
//! }
//! ```

mod log;
mod set;
mod subscribe;

pub use log::LogWriter;
pub(crate) use set::panic_info;
pub use set::SubscriberSet;
pub use subscribe::Subscribe;
