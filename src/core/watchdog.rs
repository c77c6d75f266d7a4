//! # Watchdog: hard protection against hung iterations.
//!
//! A dedicated OS thread that kills the whole process when an armed deadline
//! expires. The loop arms it before each iteration and disarms it after; a
//! runnable that never returns therefore dies on schedule, taking the
//! process with it so the process manager can start a fresh one.
//!
//! ```text
//! loop thread                      watchdog thread
//! ───────────                      ───────────────
//! arm(timeout)  ──── Arm ────────► deadline = now + timeout
//! run work...                      recv_timeout(deadline - now)
//! disarm()      ──── Disarm ─────► deadline = None
//!                                  ...
//! (hung work)                      recv_timeout expires ──► exit(1)
//! ```
//!
//! ## Rules
//! - A plain thread, not a tokio timer: a runnable that blocks the executor
//!   must still die on schedule.
//! - Re-arming replaces the pending deadline.
//! - Dropping the [`Watchdog`] disconnects the channel; the thread exits.

use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use crate::error::SuperviseError;
use crate::events::exit_code;

enum Command {
    Arm(Duration),
    Disarm,
}

/// Handle to the watchdog thread.
pub struct Watchdog {
    tx: mpsc::Sender<Command>,
}

impl Watchdog {
    /// Spawns the watchdog thread with the real kill handler
    /// (`std::process::exit(1)`).
    pub fn spawn() -> Result<Self, SuperviseError> {
        Self::spawn_with(|| std::process::exit(exit_code::WATCHDOG))
    }

    /// Spawns the watchdog thread with a custom fire handler.
    pub(crate) fn spawn_with(
        on_fire: impl FnOnce() + Send + 'static,
    ) -> Result<Self, SuperviseError> {
        let (tx, rx) = mpsc::channel();
        thread::Builder::new()
            .name("workvisor-watchdog".into())
            .spawn(move || watch(rx, on_fire))
            .map_err(|source| SuperviseError::WatchdogSetup { source })?;
        Ok(Self { tx })
    }

    /// Arms (or re-arms) the deadline `timeout` from now.
    pub fn arm(&self, timeout: Duration) {
        let _ = self.tx.send(Command::Arm(timeout));
    }

    /// Clears any pending deadline.
    pub fn disarm(&self) {
        let _ = self.tx.send(Command::Disarm);
    }
}

fn watch(rx: mpsc::Receiver<Command>, on_fire: impl FnOnce()) {
    let mut deadline: Option<Instant> = None;

    loop {
        match deadline {
            None => match rx.recv() {
                Ok(Command::Arm(timeout)) => deadline = Some(Instant::now() + timeout),
                Ok(Command::Disarm) => {}
                Err(_) => return,
            },
            Some(when) => {
                let now = Instant::now();
                if now >= when {
                    on_fire();
                    return;
                }
                match rx.recv_timeout(when - now) {
                    Ok(Command::Arm(timeout)) => deadline = Some(Instant::now() + timeout),
                    Ok(Command::Disarm) => deadline = None,
                    Err(RecvTimeoutError::Timeout) => {
                        on_fire();
                        return;
                    }
                    Err(RecvTimeoutError::Disconnected) => return,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    fn flagged() -> (Watchdog, Arc<AtomicBool>) {
        let fired = Arc::new(AtomicBool::new(false));
        let flag = fired.clone();
        let dog = Watchdog::spawn_with(move || flag.store(true, Ordering::SeqCst)).unwrap();
        (dog, fired)
    }

    #[test]
    fn test_fires_after_timeout() {
        let (dog, fired) = flagged();
        dog.arm(Duration::from_millis(30));
        thread::sleep(Duration::from_millis(150));
        assert!(fired.load(Ordering::SeqCst));
    }

    #[test]
    fn test_disarm_prevents_firing() {
        let (dog, fired) = flagged();
        dog.arm(Duration::from_millis(50));
        dog.disarm();
        thread::sleep(Duration::from_millis(150));
        assert!(!fired.load(Ordering::SeqCst));
    }

    #[test]
    fn test_rearm_replaces_deadline() {
        let (dog, fired) = flagged();
        dog.arm(Duration::from_millis(80));
        thread::sleep(Duration::from_millis(40));

        // Push the deadline out past the original one.
        dog.arm(Duration::from_millis(200));
        thread::sleep(Duration::from_millis(80));
        assert!(
            !fired.load(Ordering::SeqCst),
            "original deadline must have been replaced"
        );

        thread::sleep(Duration::from_millis(200));
        assert!(fired.load(Ordering::SeqCst));
    }

    #[test]
    fn test_unarmed_watchdog_never_fires() {
        let (dog, fired) = flagged();
        thread::sleep(Duration::from_millis(100));
        assert!(!fired.load(Ordering::SeqCst));
        drop(dog);
    }
}
