//! Environment probes: resident memory and maintenance mode.

mod maintenance;
mod memory;

pub use maintenance::{AlwaysUp, MaintenanceProbe, MaintenanceSwitch};
pub use memory::{FixedMemory, MemoryProbe, SysinfoProbe};
