//! # Work source: how the supervised unit of work is specified.
//!
//! [`WorkSource`] is a closed union over the three ways callers hand work to
//! the supervisor: an inline closure, a registered name, or an existing
//! runnable. All three funnel through one resolution point,
//! [`WorkSource::resolve`], when supervision starts.
//!
//! ```text
//! WorkSource::Inline ────────────┐
//! WorkSource::Prebuilt ──────────┼──▶ resolve ──▶ RunnableRef
//! WorkSource::Named ──▶ registry ┘
//! ```
//!
//! ## Rules
//! - `Named` resolution builds a fresh runnable from the registry factory;
//!   unknown names fail supervision before the first iteration.
//! - `Inline` and `Prebuilt` pass through unchanged.

use std::borrow::Cow;
use std::future::Future;

use crate::error::{SuperviseError, WorkError};
use crate::work::registry::WorkRegistry;
use crate::work::runnable::{RunnableFn, RunnableRef};

/// The unit of work to supervise, in one of three forms.
///
/// ## Example
/// ```rust
/// use workvisor::{RunnableFn, WorkError, WorkRegistry, WorkSource};
///
/// let registry = WorkRegistry::new()
///     .register("sync", || RunnableFn::arc("sync", || async { Ok::<_, WorkError>(()) }));
///
/// let by_name = WorkSource::named("sync");
/// assert_eq!(by_name.label(), "sync");
///
/// let resolved = by_name.resolve(&registry).unwrap();
/// assert_eq!(resolved.name(), "sync");
/// ```
#[derive(Clone)]
pub enum WorkSource {
    /// Runnable built at the call site from an async closure.
    Inline(RunnableRef),
    /// Name looked up in the [`WorkRegistry`] when supervision starts.
    Named(Cow<'static, str>),
    /// Existing runnable, used as-is.
    Prebuilt(RunnableRef),
}

impl WorkSource {
    /// Creates an inline source from a name and an async closure.
    pub fn inline<F, Fut>(name: impl Into<Cow<'static, str>>, f: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), WorkError>> + Send + 'static,
    {
        Self::Inline(RunnableFn::arc(name, f))
    }

    /// Creates a source resolved by name through the registry.
    pub fn named(name: impl Into<Cow<'static, str>>) -> Self {
        Self::Named(name.into())
    }

    /// Creates a source from an existing runnable.
    pub fn prebuilt(runnable: RunnableRef) -> Self {
        Self::Prebuilt(runnable)
    }

    /// Returns the name this source will run under.
    ///
    /// For `Named` sources this is the registry key, available before
    /// resolution.
    pub fn label(&self) -> &str {
        match self {
            Self::Inline(r) | Self::Prebuilt(r) => r.name(),
            Self::Named(name) => name,
        }
    }

    /// Resolves the source into a concrete runnable.
    pub fn resolve(self, registry: &WorkRegistry) -> Result<RunnableRef, SuperviseError> {
        match self {
            Self::Inline(r) | Self::Prebuilt(r) => Ok(r),
            Self::Named(name) => {
                registry
                    .resolve(&name)
                    .ok_or_else(|| SuperviseError::UnknownRunnable {
                        name: name.into_owned(),
                    })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_inline_source_passes_through() {
        let source = WorkSource::inline("adhoc", || async { Ok::<_, WorkError>(()) });
        assert_eq!(source.label(), "adhoc");

        let registry = WorkRegistry::new();
        let runnable = source.resolve(&registry).unwrap();
        assert_eq!(runnable.name(), "adhoc");
        runnable.run().await.unwrap();
    }

    #[test]
    fn test_prebuilt_source_keeps_identity() {
        let runnable: RunnableRef = RunnableFn::arc("fixed", || async { Ok::<_, WorkError>(()) });
        let source = WorkSource::prebuilt(runnable.clone());

        let resolved = source.resolve(&WorkRegistry::new()).unwrap();
        assert!(std::sync::Arc::ptr_eq(&runnable, &resolved));
    }

    #[test]
    fn test_unknown_name_is_a_setup_error() {
        let source = WorkSource::named("ghost");
        let err = source.resolve(&WorkRegistry::new()).err().unwrap();
        assert_eq!(err.as_label(), "supervise_unknown_runnable");
        assert!(err.as_message().contains("ghost"));
    }

    #[test]
    fn test_named_resolution_uses_factory() {
        let registry = WorkRegistry::new()
            .register("job", || RunnableFn::arc("job", || async { Ok::<_, WorkError>(()) }));

        let resolved = WorkSource::named("job").resolve(&registry).unwrap();
        assert_eq!(resolved.name(), "job");
    }
}
