//! # Event delivery to subscribers, without backpressure.
//!
//! [`SubscriberSet`] gives every subscriber its own bounded queue and its
//! own worker task. Publishing never waits: an event either fits in a
//! queue or is dropped for that subscriber, with the loss recorded as a
//! `SubscriberOverflow` event.
//!
//! ```text
//!              ┌─► queue A (bounded) ─► worker A ─► a.on_event()
//! emit_arc() ──┼─► queue B (bounded) ─► worker B ─► b.on_event()
//!              └─► queue C (bounded) ─► worker C ─► c.on_event()
//! ```
//!
//! ## Delivery guarantees
//! - Within one subscriber, events arrive in publish order.
//! - Across subscribers there is no ordering relation at all; A may be
//!   five events ahead of B.
//! - A full queue loses the newest event for that subscriber alone.
//! - A slow or panicking subscriber cannot stall the supervision loop or
//!   its peers.
//!
//! ## Panics
//! Each worker wraps `on_event` in `catch_unwind`, turns a panic into a
//! `SubscriberPanicked` event and moves on to the next queued event. The
//! wrapper is `AssertUnwindSafe`; a subscriber that panics while holding a
//! lock on shared state can leave that state poisoned.

use std::sync::Arc;

use futures::FutureExt;
use tokio::{sync::mpsc, task::JoinHandle};

use crate::events::{Bus, Event, EventKind};
use crate::subscribers::Subscribe;

/// Send half of one subscriber's queue, tagged with its name.
struct SubscriberChannel {
    name: &'static str,
    sender: mpsc::Sender<Arc<Event>>,
}

/// Owns the queues and worker tasks behind a group of subscribers.
///
/// Built once from the configured subscriber list. Events pushed through
/// [`emit`](Self::emit) or [`emit_arc`](Self::emit_arc) fan out to every
/// queue; each worker drains its own queue and survives panics in its
/// subscriber, so no observer can take the supervision loop down with it.
pub struct SubscriberSet {
    channels: Vec<SubscriberChannel>,
    workers: Vec<JoinHandle<()>>,
    bus: Bus,
}

impl SubscriberSet {
    /// Wires up a queue and spawns a worker task for each subscriber.
    ///
    /// Queue capacity comes from [`Subscribe::queue_capacity`], raised to
    /// at least 1. Workers begin draining right away and exit once their
    /// queue is closed, which [`shutdown`](Self::shutdown) arranges by
    /// dropping the send halves.
    #[must_use]
    pub fn new(subs: Vec<Arc<dyn Subscribe>>, bus: Bus) -> Self {
        let mut channels = Vec::with_capacity(subs.len());
        let mut workers = Vec::with_capacity(subs.len());

        for sub in subs {
            let cap = sub.queue_capacity().max(1);
            let name = sub.name();
            let (tx, mut rx) = mpsc::channel::<Arc<Event>>(cap);
            let s = Arc::clone(&sub);
            let bus_for_worker = bus.clone();

            let handle = tokio::spawn(async move {
                while let Some(ev) = rx.recv().await {
                    let fut = s.on_event(ev.as_ref());

                    if let Err(panic_err) = std::panic::AssertUnwindSafe(fut).catch_unwind().await {
                        let info = crate::error::panic_message(panic_err.as_ref());
                        bus_for_worker.publish(Event::subscriber_panicked(s.name(), info));
                    }
                }
            });
            channels.push(SubscriberChannel { name, sender: tx });
            workers.push(handle);
        }
        Self {
            channels,
            workers,
            bus,
        }
    }

    /// Clones the event and delivers it to every subscriber.
    ///
    /// Never blocks. [`emit_arc`](Self::emit_arc) skips the clone for
    /// callers that already hold an `Arc<Event>`.
    pub fn emit(&self, event: &Event) {
        self.emit_arc(Arc::new(event.clone()));
    }

    /// Delivers a shared event to every subscriber without cloning it.
    ///
    /// Each queue is tried with `try_send`, so this never blocks. When a
    /// queue is full or closed the event is lost for that subscriber and a
    /// `SubscriberOverflow` carrying the subscriber's name and a "full" or
    /// "closed" reason is published in its place.
    ///
    /// Overflow events themselves are exempt from that reporting, so a
    /// wedged subscriber cannot feed an overflow loop.
    pub fn emit_arc(&self, event: Arc<Event>) {
        let is_overflow_evt = matches!(event.kind, EventKind::SubscriberOverflow);

        for channel in &self.channels {
            match channel.sender.try_send(Arc::clone(&event)) {
                Ok(()) => {}
                Err(mpsc::error::TrySendError::Full(_)) => {
                    if !is_overflow_evt {
                        self.bus
                            .publish(Event::subscriber_overflow(channel.name, "full"));
                    }
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    if !is_overflow_evt {
                        self.bus
                            .publish(Event::subscriber_overflow(channel.name, "closed"));
                    }
                }
            }
        }
    }

    /// Closes every queue and waits for the workers to finish.
    ///
    /// Dropping the send halves lets each worker drain what it has
    /// already received before it exits; nothing queued is cut off.
    pub async fn shutdown(self) {
        drop(self.channels);

        for h in self.workers {
            let _ = h.await;
        }
    }

    /// Whether the set has no subscribers at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// How many subscribers are attached.
    #[must_use]
    pub fn len(&self) -> usize {
        self.channels.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct Capture {
        seen: Arc<Mutex<Vec<EventKind>>>,
    }

    #[async_trait]
    impl Subscribe for Capture {
        async fn on_event(&self, event: &Event) {
            self.seen.lock().unwrap().push(event.kind);
        }

        fn name(&self) -> &'static str {
            "capture"
        }
    }

    struct Exploder;

    #[async_trait]
    impl Subscribe for Exploder {
        async fn on_event(&self, _event: &Event) {
            panic!("subscriber exploded");
        }

        fn name(&self) -> &'static str {
            "exploder"
        }
    }

    struct Tiny;

    #[async_trait]
    impl Subscribe for Tiny {
        async fn on_event(&self, _event: &Event) {
            std::future::pending::<()>().await;
        }

        fn name(&self) -> &'static str {
            "tiny"
        }

        fn queue_capacity(&self) -> usize {
            1
        }
    }

    #[tokio::test]
    async fn test_emit_reaches_subscriber_in_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let bus = Bus::new(8);
        let set = SubscriberSet::new(vec![Arc::new(Capture { seen: seen.clone() })], bus);

        set.emit(&Event::now(EventKind::RunStarting));
        set.emit(&Event::now(EventKind::RunSucceeded));
        set.shutdown().await;

        let got = seen.lock().unwrap();
        assert_eq!(*got, vec![EventKind::RunStarting, EventKind::RunSucceeded]);
    }

    #[tokio::test]
    async fn test_panicking_subscriber_is_reported() {
        let bus = Bus::new(8);
        let mut rx = bus.subscribe();
        let set = SubscriberSet::new(vec![Arc::new(Exploder)], bus);

        set.emit(&Event::now(EventKind::RunFailed));
        set.shutdown().await;

        let report = rx.recv().await.unwrap();
        assert_eq!(report.kind, EventKind::SubscriberPanicked);
        assert_eq!(report.runnable.as_deref(), Some("exploder"));
        assert_eq!(report.reason.as_deref(), Some("subscriber exploded"));
    }

    #[tokio::test]
    async fn test_full_queue_publishes_overflow() {
        let bus = Bus::new(8);
        let mut rx = bus.subscribe();
        let set = SubscriberSet::new(vec![Arc::new(Tiny)], bus);

        // Capacity 1 and a worker that never finishes: the second emit
        // cannot be queued.
        set.emit(&Event::now(EventKind::RunStarting));
        set.emit(&Event::now(EventKind::RunSucceeded));

        let report = rx.recv().await.unwrap();
        assert_eq!(report.kind, EventKind::SubscriberOverflow);
        assert_eq!(report.runnable.as_deref(), Some("tiny"));
        assert_eq!(report.reason.as_deref(), Some("full"));
    }

    #[tokio::test]
    async fn test_len_and_empty() {
        let bus = Bus::new(8);
        let set = SubscriberSet::new(vec![], bus.clone());
        assert!(set.is_empty());

        let seen = Arc::new(Mutex::new(Vec::new()));
        let set = SubscriberSet::new(vec![Arc::new(Capture { seen })], bus);
        assert_eq!(set.len(), 1);
    }
}
