//! Error types for the supervisor and the work it runs.
//!
//! Two enums cover the two ways things go wrong:
//!
//! - [`SuperviseError`] — setup failed, so a supervision run never started.
//! - [`WorkError`] — one runnable invocation went bad.
//!
//! Each offers `as_label` (stable snake_case, for logs and metrics) and
//! `as_message` (free-form detail). Note the asymmetry in how they travel:
//! a `SuperviseError` is returned from
//! [`supervise`](crate::Supervisor::supervise) before the loop starts,
//! while a `WorkError` never escapes the loop — it is reported, published
//! as a `RunFailed` event, and absorbed.

use thiserror::Error;

/// # Errors produced while starting a supervision run.
///
/// Everything here happens before the first iteration; no work has run
/// yet. Once the loop is going, the only ways out are the process exit
/// paths (see the crate docs).
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum SuperviseError {
    /// A named work source did not resolve through the registry.
    #[error("no runnable registered under name {name:?}")]
    UnknownRunnable {
        /// The name that failed to resolve.
        name: String,
    },

    /// Installing the OS signal listeners failed.
    #[error("failed to install signal listeners: {source}")]
    SignalSetup {
        /// The underlying registration error.
        #[source]
        source: std::io::Error,
    },

    /// Spawning the watchdog timer thread failed.
    #[error("failed to spawn watchdog thread: {source}")]
    WatchdogSetup {
        /// The underlying spawn error.
        #[source]
        source: std::io::Error,
    },
}

impl SuperviseError {
    /// Stable snake_case label for logs and metrics.
    ///
    /// # Example
    /// ```
    /// use workvisor::SuperviseError;
    ///
    /// let err = SuperviseError::UnknownRunnable { name: "reindex".into() };
    /// assert_eq!(err.as_label(), "supervise_unknown_runnable");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            SuperviseError::UnknownRunnable { .. } => "supervise_unknown_runnable",
            SuperviseError::SignalSetup { .. } => "supervise_signal_setup",
            SuperviseError::WatchdogSetup { .. } => "supervise_watchdog_setup",
        }
    }

    /// Detailed, human-oriented description of the failure.
    pub fn as_message(&self) -> String {
        match self {
            SuperviseError::UnknownRunnable { name } => {
                format!("unknown runnable: {name:?}")
            }
            SuperviseError::SignalSetup { source } => {
                format!("signal setup: {source}")
            }
            SuperviseError::WatchdogSetup { source } => {
                format!("watchdog setup: {source}")
            }
        }
    }
}

/// # Errors produced by a single runnable invocation.
///
/// Every `WorkError` is recoverable from the supervisor's point of view:
/// the loop reports it, publishes it, and moves on to the next iteration.
/// Only resource ceilings and termination signals end the process.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum WorkError {
    /// The runnable returned an error for this invocation.
    #[error("execution failed: {error}")]
    Fail {
        /// Whatever the runnable reported.
        error: String,
    },

    /// The runnable panicked; the panic was contained by the loop.
    #[error("runnable panicked: {info}")]
    Panicked {
        /// Payload extracted from the panic, if any.
        info: String,
    },
}

impl WorkError {
    /// Stable snake_case label for logs and metrics.
    ///
    /// # Example
    /// ```
    /// use workvisor::WorkError;
    ///
    /// let err = WorkError::Fail { error: "boom".into() };
    /// assert_eq!(err.as_label(), "work_failed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            WorkError::Fail { .. } => "work_failed",
            WorkError::Panicked { .. } => "work_panicked",
        }
    }

    /// Detailed, human-oriented description of the failure.
    pub fn as_message(&self) -> String {
        match self {
            WorkError::Fail { error } => format!("error: {error}"),
            WorkError::Panicked { info } => format!("panic: {info}"),
        }
    }

    /// Indicates whether this failure came from a contained panic rather
    /// than an explicit `Err` return.
    ///
    /// # Example
    /// ```
    /// use workvisor::WorkError;
    ///
    /// let explicit = WorkError::Fail { error: "boom".into() };
    /// assert!(!explicit.is_panic());
    ///
    /// let contained = WorkError::Panicked { info: "index out of bounds".into() };
    /// assert!(contained.is_panic());
    /// ```
    pub fn is_panic(&self) -> bool {
        matches!(self, WorkError::Panicked { .. })
    }

    /// Builds a `Panicked` error from a payload caught by `catch_unwind`.
    pub fn from_panic(payload: Box<dyn std::any::Any + Send>) -> Self {
        WorkError::Panicked {
            info: panic_message(payload.as_ref()),
        }
    }
}

/// Extracts a readable message from a panic payload.
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
