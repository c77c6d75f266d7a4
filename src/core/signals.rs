//! # OS signal handling.
//!
//! Provides [`spawn_signal_listener`]: registers the process signal streams
//! and spawns one task that translates deliveries into
//! [`SupervisorState`] flag writes. The loop itself never touches signals;
//! it just re-reads the flags at each decision point.
//!
//! ## Signals
//! **Unix platforms:**
//! - `SIGTERM` / `SIGINT` / `SIGQUIT` → request quit (stop after the current
//!   iteration)
//! - `SIGUSR2` → pause (skip work, keep ticking)
//! - `SIGCONT` → resume
//!
//! **Non-Unix platforms:**
//! - `Ctrl-C` → request quit

use std::sync::Arc;

use crate::core::state::SupervisorState;

/// Registers signal streams and spawns the listener task.
///
/// Registration happens before the task is spawned, so an `Ok` return means
/// every handler is installed. Each call creates independent listeners.
#[cfg(unix)]
pub fn spawn_signal_listener(state: Arc<SupervisorState>) -> std::io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut terminate = signal(SignalKind::terminate())?;
    let mut interrupt = signal(SignalKind::interrupt())?;
    let mut quit = signal(SignalKind::quit())?;
    let mut pause = signal(SignalKind::user_defined2())?;
    // tokio has no named constructor for SIGCONT.
    let mut resume = signal(SignalKind::from_raw(libc::SIGCONT))?;

    tokio::spawn(async move {
        loop {
            tokio::select! {
                Some(()) = terminate.recv() => state.request_quit(),
                Some(()) = interrupt.recv() => state.request_quit(),
                Some(()) = quit.recv() => state.request_quit(),
                Some(()) = pause.recv() => state.pause(),
                Some(()) = resume.recv() => state.resume(),
                else => break,
            }
        }
    });
    Ok(())
}

/// Registers signal streams and spawns the listener task.
///
/// Non-Unix platforms only get Ctrl-C, mapped to a quit request.
#[cfg(not(unix))]
pub fn spawn_signal_listener(state: Arc<SupervisorState>) -> std::io::Result<()> {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            state.request_quit();
        }
    });
    Ok(())
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::time::Duration;

    async fn eventually(check: impl Fn() -> bool) -> bool {
        for _ in 0..200 {
            if check() {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        false
    }

    // One combined test: signals are process-wide, so exercising them
    // sequentially avoids cross-talk between parallel test threads.
    #[tokio::test]
    async fn test_signals_drive_state() {
        let state = Arc::new(SupervisorState::new());
        spawn_signal_listener(state.clone()).unwrap();

        unsafe { libc::raise(libc::SIGUSR2) };
        assert!(eventually(|| state.is_paused()).await, "SIGUSR2 pauses");

        unsafe { libc::raise(libc::SIGCONT) };
        assert!(eventually(|| !state.is_paused()).await, "SIGCONT resumes");

        // Safe to raise: our handler is installed, so the default
        // terminate disposition does not apply.
        unsafe { libc::raise(libc::SIGTERM) };
        assert!(
            eventually(|| state.quit_requested()).await,
            "SIGTERM requests quit"
        );
    }
}
