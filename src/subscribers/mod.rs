//! # Event subscribers for the supervision loop.
//!
//! Everything the supervisor publishes on the [`Bus`](crate::Bus)
//! ends up here: a forwarder task hands each event to the
//! [`SubscriberSet`], which delivers it to every registered [`Subscribe`]
//! implementation on its own queue.
//!
//! ```text
//! Supervisor ─► Bus ─► forwarder ─► SubscriberSet ─┬─► LogWriter
//!                                                  ├─► Metrics
//!                                                  └─► Custom ...
//! ```
//!
//! A custom subscriber is a type plus one method:
//! ```no_run
//! use async_trait::async_trait;
//! use workvisor::{Event, EventKind, Subscribe};
//!
//! struct FailureCounter;
//!
//! #[async_trait]
//! impl Subscribe for FailureCounter {
//!     async fn on_event(&self, event: &Event) {
//!         if matches!(event.kind, EventKind::RunFailed) {
//!             // bump a counter, page someone, ...
//!         }
//!     }
//!
//!     fn name(&self) -> &'static str { "failure-counter" }
//! }
//! ```

#[cfg(feature = "logging")]
mod log;
mod set;
mod subscribe;

#[cfg(feature = "logging")]
pub use log::LogWriter;
pub use set::SubscriberSet;
pub use subscribe::Subscribe;
