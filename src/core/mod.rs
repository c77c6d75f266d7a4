//! Runtime core: the supervision loop and its mechanics.
//!
//! This module contains the control loop itself plus the pieces it is built
//! from. The entry points are [`Supervisor`] (via [`SupervisorBuilder`]) and
//! the loop-facing data types [`SupervisorOptions`] and [`SupervisorState`].
//!
//! Modules:
//! - `supervisor`: the loop (`supervise`, per-iteration tick, stop logic);
//! - `builder`: collaborator injection and runtime wiring;
//! - `options`: per-run settings with sentinel accessors;
//! - `state`: flags shared between the loop and the signal listener;
//! - `runner`: one contained invocation with event publishing;
//! - `watchdog`: hard per-iteration deadline on a dedicated thread;
//! - `signals`: OS signal streams mapped onto state flags.

mod builder;
mod options;
mod runner;
mod signals;
mod state;
mod supervisor;
mod watchdog;

pub use builder::SupervisorBuilder;
pub use options::SupervisorOptions;
pub use signals::spawn_signal_listener;
pub use state::SupervisorState;
pub use supervisor::Supervisor;
pub use watchdog::Watchdog;
