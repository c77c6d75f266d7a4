//! # Runnable abstraction and function-backed implementation.
//!
//! This module defines the [`Runnable`] trait (a named, zero-argument async
//! unit of work) and a convenient function-backed implementation
//! [`RunnableFn`]. The common handle type is [`RunnableRef`], an
//! `Arc<dyn Runnable>` suitable for sharing across the runtime.
//!
//! One invocation of [`Runnable::run`] is expected to process a bounded batch
//! and return; the supervision loop calls it again on the next iteration. A
//! run that never returns is killed by the watchdog, process and all.

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::WorkError;

/// Shared handle to a runnable.
pub type RunnableRef = Arc<dyn Runnable>;

/// # Named, zero-argument async unit of work.
///
/// A `Runnable` has a stable [`name`](Runnable::name) and an async
/// [`run`](Runnable::run) method invoked once per loop iteration. Failures
/// are returned as [`WorkError`]; the loop absorbs them and keeps going.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use workvisor::{Runnable, WorkError};
///
/// struct MailboxSync;
///
/// #[async_trait]
/// impl Runnable for MailboxSync {
///     fn name(&self) -> &str { "sync-mailboxes" }
///
///     async fn run(&self) -> Result<(), WorkError> {
///         // process one batch...
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Runnable: Send + Sync + 'static {
    /// Returns a stable, human-readable name.
    fn name(&self) -> &str;

    /// Executes one bounded batch of work.
    async fn run(&self) -> Result<(), WorkError>;
}

/// Function-backed runnable implementation.
///
/// Wraps a closure that *creates* a new future per invocation, so there is no
/// shared mutable state between iterations. If iterations need to share
/// state, capture an `Arc<...>` explicitly inside the closure.
///
/// ## Example
/// ```rust
/// use workvisor::{RunnableFn, RunnableRef, WorkError};
///
/// let r: RunnableRef = RunnableFn::arc("worker", || async {
///     // real work here
///     Ok::<_, WorkError>(())
/// });
///
/// assert_eq!(r.name(), "worker");
/// ```
pub struct RunnableFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> RunnableFn<F> {
    /// Creates a new function-backed runnable.
    ///
    /// Prefer [`RunnableFn::arc`] when you immediately need a [`RunnableRef`].
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self { name: name.into(), f }
    }

    /// Creates the runnable and returns it as a shared handle.
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

#[async_trait]
impl<F, Fut> Runnable for RunnableFn<F>
where
    F: Fn() -> Fut + Send + Sync + 'static, // Fn, not FnMut
    Fut: Future<Output = Result<(), WorkError>> + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self) -> Result<(), WorkError> {
        (self.f)().await
    }
}
