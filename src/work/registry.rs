//! # Name-to-factory registry for runnables.
//!
//! [`WorkRegistry`] maps stable names to factories that build a fresh
//! [`RunnableRef`] on demand. Resolution happens once, when supervision
//! starts; after that the loop holds the resolved runnable directly.
//!
//! ## Rules
//! - Factories are `Fn`, not `FnOnce`: resolving the same name twice yields
//!   two independent runnables.
//! - Registering a name twice replaces the earlier factory.

use std::collections::HashMap;

use crate::work::runnable::RunnableRef;

type RunnableFactory = Box<dyn Fn() -> RunnableRef + Send + Sync>;

/// Registry of named runnable factories.
///
/// ## Example
/// ```rust
/// use workvisor::{RunnableFn, WorkError, WorkRegistry};
///
/// let registry = WorkRegistry::new()
///     .register("sync", || RunnableFn::arc("sync", || async { Ok::<_, WorkError>(()) }));
///
/// assert!(registry.contains("sync"));
/// assert!(registry.resolve("missing").is_none());
/// ```
#[derive(Default)]
pub struct WorkRegistry {
    factories: HashMap<String, RunnableFactory>,
}

impl WorkRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a factory under the given name (chainable).
    pub fn register(
        mut self,
        name: impl Into<String>,
        factory: impl Fn() -> RunnableRef + Send + Sync + 'static,
    ) -> Self {
        self.factories.insert(name.into(), Box::new(factory));
        self
    }

    /// Builds a fresh runnable for the given name, if registered.
    pub fn resolve(&self, name: &str) -> Option<RunnableRef> {
        self.factories.get(name).map(|factory| factory())
    }

    /// Returns true if the name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Returns the sorted list of registered names.
    pub fn list(&self) -> Vec<String> {
        let mut names: Vec<String> = self.factories.keys().cloned().collect();
        names.sort_unstable();
        names
    }

    /// Returns true if no factories are registered.
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WorkError;
    use crate::work::runnable::RunnableFn;

    fn noop(name: &'static str) -> RunnableRef {
        RunnableFn::arc(name, || async { Ok::<_, WorkError>(()) })
    }

    #[test]
    fn test_resolve_builds_fresh_instances() {
        let registry = WorkRegistry::new().register("job", || noop("job"));

        let a = registry.resolve("job").unwrap();
        let b = registry.resolve("job").unwrap();
        assert!(
            !std::sync::Arc::ptr_eq(&a, &b),
            "each resolve should build a new runnable"
        );
        assert_eq!(a.name(), "job");
    }

    #[test]
    fn test_unknown_name_resolves_to_none() {
        let registry = WorkRegistry::new();
        assert!(registry.resolve("ghost").is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_list_is_sorted() {
        let registry = WorkRegistry::new()
            .register("zeta", || noop("zeta"))
            .register("alpha", || noop("alpha"))
            .register("mid", || noop("mid"));

        assert_eq!(registry.list(), vec!["alpha", "mid", "zeta"]);
    }

    #[test]
    fn test_register_twice_replaces() {
        let registry = WorkRegistry::new()
            .register("job", || noop("first"))
            .register("job", || noop("second"));

        let resolved = registry.resolve("job").unwrap();
        assert_eq!(resolved.name(), "second");
        assert_eq!(registry.list().len(), 1);
    }
}
