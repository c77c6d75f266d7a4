//! # Resident-memory probe.
//!
//! The supervisor compares the process's resident set size against its
//! configured ceiling after every iteration. [`SysinfoProbe`] reads the real
//! figure for the current PID; [`FixedMemory`] reports whatever a test tells
//! it to.
//!
//! ## Rules
//! - `resident_bytes` is a local, synchronous read (one `/proc` refresh per
//!   call on Linux). It runs once per iteration, not in a hot path.
//! - A probe that cannot find its process reports 0, which never trips the
//!   ceiling.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, System};

/// Source of the supervised process's resident memory figure.
pub trait MemoryProbe: Send + Sync {
    /// Returns the current resident set size, in bytes.
    fn resident_bytes(&self) -> u64;
}

/// Probe backed by `sysinfo`, reading the current process's RSS.
pub struct SysinfoProbe {
    pid: Pid,
    system: Mutex<System>,
}

impl SysinfoProbe {
    /// Creates a probe bound to the calling process.
    pub fn current() -> Self {
        Self {
            pid: Pid::from_u32(std::process::id()),
            system: Mutex::new(System::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, System> {
        self.system.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for SysinfoProbe {
    fn default() -> Self {
        Self::current()
    }
}

impl MemoryProbe for SysinfoProbe {
    fn resident_bytes(&self) -> u64 {
        let mut system = self.lock();
        system.refresh_processes_specifics(
            ProcessesToUpdate::Some(&[self.pid]),
            true,
            ProcessRefreshKind::new().with_memory(),
        );
        system.process(self.pid).map(|p| p.memory()).unwrap_or(0)
    }
}

/// Probe reporting a caller-controlled figure. Test aid.
#[derive(Debug, Default)]
pub struct FixedMemory {
    bytes: AtomicU64,
}

impl FixedMemory {
    /// Creates a probe reporting `bytes`.
    pub fn new(bytes: u64) -> Self {
        Self {
            bytes: AtomicU64::new(bytes),
        }
    }

    /// Changes the reported figure.
    pub fn set(&self, bytes: u64) {
        self.bytes.store(bytes, Ordering::SeqCst);
    }
}

impl MemoryProbe for FixedMemory {
    fn resident_bytes(&self) -> u64 {
        self.bytes.load(Ordering::SeqCst)
    }
}
