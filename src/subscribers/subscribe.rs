//! # The subscriber extension point.
//!
//! Implement [`Subscribe`] to watch what the supervisor is doing. The
//! runtime keeps observers off the critical path: every subscriber is
//! handed its own bounded queue and a worker task that drains it.
//!
//! ```text
//! supervision loop ──publish──► [queue] ──► worker ──► on_event()
//! ```
//!
//! A subscriber that falls behind fills only its own queue. Once full,
//! further events are dropped for it and reported as
//! `EventKind::SubscriberOverflow` while everyone else keeps receiving.
//! Panics inside `on_event` are caught by the worker and surface as
//! `EventKind::SubscriberPanicked`. Within one subscriber, events always
//! arrive in publish order.

use async_trait::async_trait;

use crate::events::Event;

/// An observer of supervision events.
///
/// The runtime runs each implementation behind its own queue and worker
/// task: `on_event` calls are sequential per subscriber and panics are
/// contained, so a misbehaving observer never reaches the supervision
/// loop. Implementations should stick to async I/O and swallow their own
/// errors — there is nobody upstream to handle them.
///
/// ## Example
/// ```rust
/// use async_trait::async_trait;
/// use workvisor::{Event, EventKind, Subscribe};
///
/// struct Metrics;
///
/// #[async_trait]
/// impl Subscribe for Metrics {
///     async fn on_event(&self, ev: &Event) {
///         if matches!(ev.kind, EventKind::RunFailed) {
///             // export a metric, etc.
///         }
///     }
///
///     fn name(&self) -> &'static str { "metrics" }      // shows up in overflow/panic events
///     fn queue_capacity(&self) -> usize { 2048 }        // metrics tolerate a deeper queue
/// }
/// ```
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Handles one event.
    ///
    /// Runs on this subscriber's worker task, never in the publisher's
    /// context, and events arrive one at a time in publish order. A panic
    /// here is caught and surfaces as `EventKind::SubscriberPanicked`.
    async fn on_event(&self, event: &Event);

    /// Short identifier attached to this subscriber's overflow and panic
    /// events.
    ///
    /// The default is `type_name::<Self>()`, which tends to be long; most
    /// implementations return a literal like `"metrics"` or `"audit"`
    /// instead.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// How many events this subscriber's queue may buffer.
    ///
    /// When the queue is full the next event is dropped for this
    /// subscriber alone and a `SubscriberOverflow` is published; delivery
    /// to the other subscribers is unaffected. Values below 1 are raised
    /// to 1.
    ///
    /// Default: 1024.
    fn queue_capacity(&self) -> usize {
        1024
    }
}
