//! # Work dispatch seam.
//!
//! [`WorkDispatcher`] decouples "what a unit of work is" from "how the loop
//! invokes it". The default [`DirectDispatcher`] simply calls
//! [`Runnable::run`]; embedders can interpose queueing, tracing spans, or a
//! remote handoff without touching the loop.

use async_trait::async_trait;

use crate::error::WorkError;
use crate::work::runnable::Runnable;

/// Strategy for invoking a resolved runnable.
#[async_trait]
pub trait WorkDispatcher: Send + Sync {
    /// Invokes the runnable once and returns its outcome.
    async fn dispatch(&self, runnable: &dyn Runnable) -> Result<(), WorkError>;
}

/// Dispatcher that invokes the runnable in place.
#[derive(Debug, Default, Clone, Copy)]
pub struct DirectDispatcher;

#[async_trait]
impl WorkDispatcher for DirectDispatcher {
    async fn dispatch(&self, runnable: &dyn Runnable) -> Result<(), WorkError> {
        runnable.run().await
    }
}
