//! # Error reporting seam.
//!
//! Every failure a runnable produces, explicit errors and contained panics
//! alike, is handed to an [`ErrorReporter`] before the loop moves on. Wire
//! this to Sentry, a log shipper, or a counter; the default [`NullReporter`]
//! swallows everything.
//!
//! ## Rules
//! - Reporting is infallible by signature. A reporter that can fail must
//!   absorb its own errors; the loop will not.

use async_trait::async_trait;

use crate::error::WorkError;

/// Sink for failures caught by the supervision loop.
#[async_trait]
pub trait ErrorReporter: Send + Sync {
    /// Records one failure.
    async fn report(&self, error: &WorkError);
}

/// Reporter that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullReporter;

#[async_trait]
impl ErrorReporter for NullReporter {
    async fn report(&self, _error: &WorkError) {}
}
