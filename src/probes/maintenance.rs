//! # Maintenance-mode probe.
//!
//! When the application is down for maintenance the loop skips work (unless
//! the `force` option overrides it) but keeps ticking, so it resumes by
//! itself the moment maintenance ends.
//!
//! The probe is async: real deployments answer this from a flag file, a
//! database row, or a cache key.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;

/// Answers "is the application down for maintenance right now?".
#[async_trait]
pub trait MaintenanceProbe: Send + Sync {
    /// Returns true while maintenance mode is active.
    async fn is_down_for_maintenance(&self) -> bool;
}

/// Probe for applications that have no maintenance mode. Never down.
#[derive(Debug, Default, Clone, Copy)]
pub struct AlwaysUp;

#[async_trait]
impl MaintenanceProbe for AlwaysUp {
    async fn is_down_for_maintenance(&self) -> bool {
        false
    }
}

/// Flip-switch probe for tests and single-process embedders.
#[derive(Debug, Default)]
pub struct MaintenanceSwitch {
    down: AtomicBool,
}

impl MaintenanceSwitch {
    /// Creates a switch in the "up" position.
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves the switch.
    pub fn set_down(&self, down: bool) {
        self.down.store(down, Ordering::SeqCst);
    }

    /// Reads the switch without going through the trait.
    pub fn is_down(&self) -> bool {
        self.down.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MaintenanceProbe for MaintenanceSwitch {
    async fn is_down_for_maintenance(&self) -> bool {
        self.is_down()
    }
}
