//! # Broadcast bus for runtime events.
//!
//! Fan-out channel connecting the supervision loop to its subscribers.
//!
//! ```text
//!                 ┌──────────────┐
//!      publish ──▶│     Bus      │──▶ subscriber A
//!                 │  (broadcast) │──▶ subscriber B
//!                 └──────────────┘──▶ subscriber C
//! ```
//!
//! ## Rules
//! - Publishing never blocks and never fails: with no receivers the event is
//!   dropped.
//! - Each receiver observes events in publish order; slow receivers that fall
//!   behind the channel capacity lose the oldest events (`Lagged`).

use tokio::sync::broadcast;

use crate::events::Event;

/// Broadcast bus carrying [`Event`]s from the loop to subscribers.
///
/// Cheap to clone; all clones publish into the same channel.
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
}

impl Bus {
    /// Creates a bus with the given channel capacity (clamped to at least 1).
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Creates a new receiver observing all events published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }

    /// Publishes an event to all current receivers.
    ///
    /// Returns the number of receivers the event was delivered to.
    pub fn publish(&self, event: Event) -> usize {
        self.tx.send(event).unwrap_or(0)
    }

    /// Publishes a clone of the referenced event.
    #[inline]
    pub fn publish_ref(&self, event: &Event) -> usize {
        self.publish(event.clone())
    }
}
