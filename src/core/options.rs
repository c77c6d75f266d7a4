//! # Supervision options.
//!
//! Provides [`SupervisorOptions`], the per-run settings for the loop.
//!
//! Options are read once when supervision starts; there is no hot reload.
//! Runtime state that changes while the loop runs lives in
//! [`SupervisorState`](crate::SupervisorState).
//!
//! ## Sentinel values
//! - `timeout = 0s` → watchdog disabled
//! - `max_runs = 0` → no run budget
//! - `max_lifetime = 0s` → no lifetime ceiling

use std::time::Duration;

/// Settings for one supervision run.
///
/// Defines:
/// - **Hang protection**: per-iteration watchdog timeout
/// - **Memory ceiling**: resident-size limit that ends the process
/// - **Maintenance override**: whether to keep working during maintenance
/// - **Budgets**: optional run-count and lifetime limits
///
/// ## Field semantics
/// - `timeout`: watchdog ceiling per iteration (`0s` = watchdog off)
/// - `memory_limit_mb`: resident memory ceiling in MiB; crossing it stops the
///   process with exit code 12
/// - `force`: run even while the application is down for maintenance
/// - `max_runs`: stop cleanly after this many invocations (`0` = unlimited)
/// - `max_lifetime`: stop cleanly once the supervisor has lived this long
///   (`0s` = unlimited)
///
/// ## Notes
/// All fields are public for flexibility. Prefer the helper accessors to
/// avoid sprinkling sentinel checks (`0`) across the codebase.
///
/// ## Example
/// ```rust
/// use std::time::Duration;
/// use workvisor::SupervisorOptions;
///
/// let opts = SupervisorOptions {
///     timeout: Duration::from_secs(30),
///     memory_limit_mb: 256,
///     ..SupervisorOptions::default()
/// };
///
/// assert_eq!(opts.watchdog_timeout(), Some(Duration::from_secs(30)));
/// assert_eq!(opts.memory_limit_bytes(), 256 * 1024 * 1024);
/// assert_eq!(opts.run_limit(), None);
/// ```
#[derive(Clone, Debug)]
pub struct SupervisorOptions {
    /// Maximum wall-clock time one iteration may take.
    ///
    /// When exceeded, the watchdog kills the whole process with exit code 1;
    /// there is no in-process recovery from a hung iteration.
    /// `Duration::ZERO` disables the watchdog.
    pub timeout: Duration,

    /// Resident memory ceiling, in MiB.
    ///
    /// Checked after every iteration. Crossing it stops the process with
    /// exit code 12 so the process manager can restart it fresh.
    pub memory_limit_mb: u64,

    /// Keep running while the application is down for maintenance.
    pub force: bool,

    /// Stop cleanly after this many runnable invocations.
    ///
    /// `0` = unlimited. Useful against slow leaks: recycle the process on a
    /// schedule instead of waiting for the memory ceiling.
    pub max_runs: u64,

    /// Stop cleanly once the supervisor has been alive this long.
    ///
    /// `Duration::ZERO` = unlimited.
    pub max_lifetime: Duration,
}

impl SupervisorOptions {
    /// Returns the watchdog timeout as an `Option`.
    ///
    /// - `None` → watchdog disabled
    /// - `Some(d)` → iterations longer than `d` kill the process
    #[inline]
    pub fn watchdog_timeout(&self) -> Option<Duration> {
        if self.timeout == Duration::ZERO {
            None
        } else {
            Some(self.timeout)
        }
    }

    /// Returns the run budget as an `Option`.
    #[inline]
    pub fn run_limit(&self) -> Option<u64> {
        if self.max_runs == 0 {
            None
        } else {
            Some(self.max_runs)
        }
    }

    /// Returns the lifetime ceiling as an `Option`.
    #[inline]
    pub fn lifetime_limit(&self) -> Option<Duration> {
        if self.max_lifetime == Duration::ZERO {
            None
        } else {
            Some(self.max_lifetime)
        }
    }

    /// Returns the memory ceiling in bytes.
    ///
    /// Saturates at `u64::MAX` rather than overflowing for absurd limits.
    #[inline]
    pub fn memory_limit_bytes(&self) -> u64 {
        self.memory_limit_mb.saturating_mul(1024 * 1024)
    }
}

impl Default for SupervisorOptions {
    /// Default options:
    ///
    /// - `timeout = 60s` (generous per-iteration ceiling)
    /// - `memory_limit_mb = 128`
    /// - `force = false`
    /// - `max_runs = 0` (unlimited)
    /// - `max_lifetime = 0s` (unlimited)
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(60),
            memory_limit_mb: 128,
            force: false,
            max_runs: 0,
            max_lifetime: Duration::ZERO,
        }
    }
}
