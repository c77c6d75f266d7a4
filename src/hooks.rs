//! # Loop hooks: ordered veto points around each iteration.
//!
//! A [`LoopHook`] gets two votes per iteration:
//! - [`loop_beginning`](LoopHook::loop_beginning) before the run decision:
//!   `false` skips this iteration (the loop sleeps and re-evaluates).
//! - [`loop_completing`](LoopHook::loop_completing) after the iteration:
//!   `false` stops the supervisor with exit code 0.
//!
//! Hooks are held as an ordered list; evaluation short-circuits on the first
//! `false`, so later hooks do not observe vetoed iterations.
//!
//! Both methods default to `true`, so a hook can implement only the side it
//! cares about.

use async_trait::async_trait;

/// Veto callbacks evaluated around every loop iteration.
#[async_trait]
pub trait LoopHook: Send + Sync {
    /// Votes on whether this iteration may run. `false` skips it.
    async fn loop_beginning(&self) -> bool {
        true
    }

    /// Votes on whether the loop may continue. `false` stops the supervisor.
    async fn loop_completing(&self) -> bool {
        true
    }
}
