//! # Mutable supervision state.
//!
//! Provides [`SupervisorState`], the handful of flags the loop reads every
//! iteration and the signal listener mutates from its own task.
//!
//! ## Rules
//! - `paused` toggles freely: pause and resume can alternate forever.
//! - `should_quit` is one-way. Once requested, nothing clears it; in
//!   particular a resume signal after a terminate signal does not cancel the
//!   pending stop.
//! - The recorded restart epoch is a snapshot of the shared store taken when
//!   supervision starts; the loop compares fresh reads against it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Shared flags connecting the signal listener to the loop.
///
/// All methods are callable from any task or thread.
#[derive(Debug, Default)]
pub struct SupervisorState {
    paused: AtomicBool,
    should_quit: AtomicBool,
    last_restart_epoch: Mutex<Option<i64>>,
}

impl SupervisorState {
    /// Creates state with nothing requested: running, no quit, no epoch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pauses the loop: iterations skip work until [`resume`](Self::resume).
    pub fn pause(&self) {
        self.paused.store(true, Ordering::SeqCst);
    }

    /// Resumes a paused loop. Does not clear a pending quit.
    pub fn resume(&self) {
        self.paused.store(false, Ordering::SeqCst);
    }

    /// True while the loop is paused.
    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }

    /// Asks the loop to stop after the current iteration. Irreversible.
    pub fn request_quit(&self) {
        self.should_quit.store(true, Ordering::SeqCst);
    }

    /// True once a quit has been requested.
    pub fn quit_requested(&self) -> bool {
        self.should_quit.load(Ordering::SeqCst)
    }

    /// Records the restart epoch observed when supervision started.
    pub fn record_restart_epoch(&self, epoch: Option<i64>) {
        *self.epoch_slot() = epoch;
    }

    /// Returns the restart epoch recorded at supervision start.
    pub fn last_restart_epoch(&self) -> Option<i64> {
        *self.epoch_slot()
    }

    fn epoch_slot(&self) -> MutexGuard<'_, Option<i64>> {
        self.last_restart_epoch
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
