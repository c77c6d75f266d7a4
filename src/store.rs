//! # Restart-epoch store.
//!
//! A fleet of worker processes is restarted by bumping a shared counter (the
//! "restart epoch") in a store every process can see. Each supervisor
//! captures the epoch when its loop starts and re-reads it after every
//! iteration; a changed value means "a newer deploy wants fresh processes"
//! and the supervisor exits cleanly so the process manager can respawn it.
//!
//! ## Rules
//! - The supervisor only ever **reads** the epoch. Writes come from deploy
//!   tooling (or tests) through whatever backs the store.
//! - `None` and `Some(n)` are distinct: a key appearing or disappearing is a
//!   change like any other.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

/// Key under which the supervisor polls the shared restart epoch.
pub const RESTART_EPOCH_KEY: &str = "workvisor:restart";

/// Read seam over the shared epoch store.
///
/// Implement this over Redis, a database, a file, or anything else the whole
/// fleet can see.
#[async_trait]
pub trait EpochStore: Send + Sync {
    /// Returns the current value under `key`, or `None` if unset.
    async fn get(&self, key: &str) -> Option<i64>;
}

/// In-memory epoch store for tests, demos, and single-process embedding.
///
/// ## Example
/// ```rust
/// use workvisor::{EpochStore, MemoryEpochStore, RESTART_EPOCH_KEY};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let store = MemoryEpochStore::new();
/// assert_eq!(store.get(RESTART_EPOCH_KEY).await, None);
///
/// store.set(RESTART_EPOCH_KEY, 3);
/// assert_eq!(store.get(RESTART_EPOCH_KEY).await, Some(3));
///
/// let bumped = store.bump(RESTART_EPOCH_KEY);
/// assert_eq!(bumped, 4);
/// # }
/// ```
#[derive(Default)]
pub struct MemoryEpochStore {
    values: Mutex<HashMap<String, i64>>,
}

impl MemoryEpochStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `key` to `value`.
    pub fn set(&self, key: &str, value: i64) {
        self.lock().insert(key.to_string(), value);
    }

    /// Increments `key` by one (unset keys start at 0) and returns the new
    /// value.
    pub fn bump(&self, key: &str) -> i64 {
        let mut values = self.lock();
        let slot = values.entry(key.to_string()).or_insert(0);
        *slot += 1;
        *slot
    }

    /// Removes `key`, returning the previous value if any.
    pub fn clear(&self, key: &str) -> Option<i64> {
        self.lock().remove(key)
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, i64>> {
        self.values.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl EpochStore for MemoryEpochStore {
    async fn get(&self, key: &str) -> Option<i64> {
        self.lock().get(key).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_then_get_round_trips() {
        let store = MemoryEpochStore::new();
        store.set(RESTART_EPOCH_KEY, 42);
        assert_eq!(store.get(RESTART_EPOCH_KEY).await, Some(42));
    }

    #[tokio::test]
    async fn test_unset_key_reads_none() {
        let store = MemoryEpochStore::new();
        assert_eq!(store.get("absent").await, None);
    }

    #[tokio::test]
    async fn test_bump_starts_from_zero() {
        let store = MemoryEpochStore::new();
        assert_eq!(store.bump("k"), 1);
        assert_eq!(store.bump("k"), 2);
        assert_eq!(store.get("k").await, Some(2));
    }

    #[tokio::test]
    async fn test_clear_removes_key() {
        let store = MemoryEpochStore::new();
        store.set("k", 9);
        assert_eq!(store.clear("k"), Some(9));
        assert_eq!(store.get("k").await, None);
    }
}
