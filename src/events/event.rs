//! # Runtime events emitted by the supervision loop.
//!
//! [`EventKind`] names what happened; [`Event`] wraps a kind together with
//! whatever metadata applies — runnable name, iteration, reason, exit code —
//! plus a timestamp and a sequence number. The kinds fall into three
//! groups: run events for single invocations, one terminal event published
//! right before the process exits, and delivery events for subscriber-side
//! incidents.
//!
//! Subscribers observe events at their own pace, so `seq` (drawn from one
//! process-wide counter, strictly increasing) is how global order gets
//! reconstructed after the fact.
//!
//! ## Example
//! ```rust
//! use workvisor::{Event, EventKind};
//!
//! let ev = Event::now(EventKind::RunFailed)
//!     .with_runnable("sync-mailboxes")
//!     .with_iteration(3)
//!     .with_reason("connection refused");
//!
//! assert_eq!(ev.kind, EventKind::RunFailed);
//! assert_eq!(ev.runnable.as_deref(), Some("sync-mailboxes"));
//! assert_eq!(ev.reason.as_deref(), Some("connection refused"));
//! ```

use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::time::SystemTime;

/// Process-wide counter behind `Event::seq`.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Process status codes the supervisor exits with.
///
/// The surrounding process manager (systemd, runit, a container runtime)
/// distinguishes restartable stops from the memory-pressure stop by code.
pub mod exit_code {
    /// Clean stop: quit signal, restart epoch, hook veto, or a spent limit.
    pub const NORMAL: i32 = 0;
    /// The watchdog killed a hung iteration.
    pub const WATCHDOG: i32 = 1;
    /// Resident memory crossed the configured ceiling.
    pub const MEMORY_EXCEEDED: i32 = 12;
}

/// Why the supervisor decided to stop.
///
/// Variants are listed in evaluation order: memory is checked before the
/// quit flag, the quit flag before the epoch, and so on. The first matching
/// cause wins.
///
/// ## Example
/// ```rust
/// use workvisor::StopCause;
///
/// assert_eq!(StopCause::MemoryExceeded.as_label(), "memory_exceeded");
/// assert_eq!(StopCause::MemoryExceeded.exit_code(), 12);
/// assert_eq!(StopCause::QuitRequested.exit_code(), 0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopCause {
    /// Resident memory crossed the configured ceiling.
    MemoryExceeded,
    /// A terminate signal (or programmatic request) asked the loop to quit.
    QuitRequested,
    /// The shared restart epoch moved past the value captured at start.
    RestartRequested,
    /// A loop-completing hook vetoed continuation.
    HookVeto,
    /// The configured run budget is spent.
    RunLimitReached,
    /// The configured lifetime is over.
    LifetimeReached,
}

impl StopCause {
    /// Returns a stable label for events and logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            StopCause::MemoryExceeded => "memory_exceeded",
            StopCause::QuitRequested => "quit_requested",
            StopCause::RestartRequested => "restart_requested",
            StopCause::HookVeto => "hook_veto",
            StopCause::RunLimitReached => "run_limit_reached",
            StopCause::LifetimeReached => "lifetime_reached",
        }
    }

    /// Returns the process status code for this cause.
    pub fn exit_code(&self) -> i32 {
        match self {
            StopCause::MemoryExceeded => exit_code::MEMORY_EXCEEDED,
            StopCause::QuitRequested
            | StopCause::RestartRequested
            | StopCause::HookVeto
            | StopCause::RunLimitReached
            | StopCause::LifetimeReached => exit_code::NORMAL,
        }
    }
}

/// Discriminant for everything the supervisor publishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Run events ===
    /// A runnable invocation is starting.
    ///
    /// Carries `runnable` and the 1-based `iteration` for this process.
    RunStarting,

    /// A runnable invocation completed successfully.
    ///
    /// Carries `runnable` and `iteration`.
    RunSucceeded,

    /// A runnable invocation failed (explicit error or contained panic).
    ///
    /// The loop absorbs the failure and continues; this event is the
    /// fire-and-forget record of it. Carries `runnable`, `iteration` and
    /// the failure message in `reason`.
    RunFailed,

    // === Terminal events ===
    /// The supervisor decided to stop and is about to exit the process.
    ///
    /// Published once, immediately before `std::process::exit`. Carries
    /// the stop-cause label (e.g. `"memory_exceeded"`) in `reason` and the
    /// chosen status in `exit_code`.
    SupervisorStopping,

    // === Delivery events ===
    /// An event could not be queued for a subscriber.
    ///
    /// The subscriber's name rides in the `runnable` slot; `reason` says
    /// whether its queue was "full" or "closed".
    SubscriberOverflow,

    /// `on_event` panicked inside a subscriber's worker.
    ///
    /// The subscriber's name rides in the `runnable` slot and the panic
    /// message in `reason`.
    SubscriberPanicked,
}

/// One published occurrence, timestamped and sequenced.
///
/// Only `seq`, `at` and `kind` are always present; the remaining fields
/// are filled per [`EventKind`] and stay `None` otherwise.
#[derive(Clone, Debug)]
pub struct Event {
    /// Position in the process-wide publish order; strictly increasing.
    pub seq: u64,
    /// When the event was created.
    pub at: SystemTime,
    /// What happened.
    pub kind: EventKind,

    /// Name of the runnable (or subscriber, for delivery events).
    pub runnable: Option<Arc<str>>,
    /// 1-based invocation count at the time of the event.
    pub iteration: Option<u64>,
    /// Free-form explanation, such as an error message or a stop-cause label.
    pub reason: Option<Arc<str>>,
    /// Process status code (set on [`EventKind::SupervisorStopping`]).
    pub exit_code: Option<i32>,
}

impl Event {
    /// Stamps a fresh event of `kind` with the current time and the next
    /// sequence number.
    pub fn now(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            runnable: None,
            iteration: None,
            reason: None,
            exit_code: None,
        }
    }

    /// Sets the runnable (or subscriber) name.
    #[inline]
    pub fn with_runnable(mut self, name: impl Into<Arc<str>>) -> Self {
        self.runnable = Some(name.into());
        self
    }

    /// Sets the invocation number.
    #[inline]
    pub fn with_iteration(mut self, n: u64) -> Self {
        self.iteration = Some(n);
        self
    }

    /// Sets the explanation string.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Sets the process status code.
    #[inline]
    pub fn with_exit_code(mut self, code: i32) -> Self {
        self.exit_code = Some(code);
        self
    }

    /// Overflow event for `subscriber`, with the drop `reason`.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::now(EventKind::SubscriberOverflow)
            .with_runnable(subscriber)
            .with_reason(reason)
    }

    /// Panic event for `subscriber`, carrying the panic message.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::now(EventKind::SubscriberPanicked)
            .with_runnable(subscriber)
            .with_reason(info)
    }

    #[inline]
    pub fn is_subscriber_overflow(&self) -> bool {
        matches!(self.kind, EventKind::SubscriberOverflow)
    }

    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(self.kind, EventKind::SupervisorStopping)
    }
}
