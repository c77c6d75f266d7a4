//! # workvisor
//!
//! **Workvisor** is a process supervision library for long-running workers.
//!
//! It drives a single unit of work in an endless supervised loop. Every
//! iteration runs under a hard watchdog deadline; after every pass the loop
//! re-evaluates ordered stop conditions (memory ceiling, quit signal,
//! fleet-wide restart epoch, veto hooks, run/lifetime budgets) and ends the
//! process with a meaningful exit code so a process manager can respawn it
//! fresh.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!        WorkSource (inline | named | prebuilt)
//!                        │ resolve (WorkRegistry)
//!                        ▼
//! ┌───────────────────────────────────────────────────────────┐
//! │  Supervisor (control loop, one runnable)                  │
//! │  - SupervisorOptions (timeout, memory ceiling, budgets)   │
//! │  - SupervisorState ◄── signal listener (TERM/USR2/CONT)   │
//! │  - Watchdog thread (hard exit 1 on hung iterations)       │
//! │  - probes: maintenance, memory                            │
//! │  - EpochStore (fleet restart), LoopHooks (vetoes)         │
//! └──────┬────────────────────────────────────────────────────┘
//!        │ per iteration
//!        ▼
//!   run_once(runnable via WorkDispatcher)
//!        │ publishes RunStarting / RunSucceeded / RunFailed
//!        ▼
//! ┌───────────────────────────────────────────────────────────┐
//! │                 Bus (broadcast channel)                   │
//! └──────────────────────────┬────────────────────────────────┘
//!                            ▼
//!                   subscriber listener
//!                            ▼
//!                      SubscriberSet
//!                 ┌──────────┼──────────┐
//!                 ▼          ▼          ▼
//!             [queue S1] [queue S2] [queue SN]
//!                 │          │          │
//!             worker S1  worker S2  worker SN
//!                 ▼          ▼          ▼
//!               sub1.on_   sub2.on_  subN.on_
//!                event()    event()   event()
//! ```
//!
//! ### Lifecycle
//! ```text
//! WorkSource ──► Supervisor::supervise() ──► resolve ──► loop
//!
//! loop {
//!   ├─► arm watchdog (options.timeout; 0 = disabled)
//!   ├─► should_run()?   (maintenance unless force / paused / hook veto)
//!   │     ├─ yes ─► run_once(runnable)
//!   │     │          ├─ Ok  ──► publish RunSucceeded
//!   │     │          └─ Err ──► report, publish RunFailed, keep looping
//!   │     │          disarm watchdog
//!   │     └─ no  ─► disarm watchdog, sleep 1s
//!   │
//!   └─► stop_condition()?   (checked in order)
//!         ├─ memory ceiling crossed  ─► exit 12
//!         ├─ quit requested          ─► exit 0
//!         ├─ restart epoch changed   ─► exit 0
//!         ├─ completing hook veto    ─► exit 0
//!         ├─ run budget spent        ─► exit 0
//!         └─ lifetime over           ─► exit 0
//!              (each: publish SupervisorStopping, drain, process::exit)
//! }
//!
//! Hung iteration: watchdog thread fires ──► process::exit(1)
//! ```
//!
//! ## Features
//! | Area               | Description                                                              | Key types / traits                                   |
//! |--------------------|--------------------------------------------------------------------------|------------------------------------------------------|
//! | **Supervision**    | One-runnable-per-iteration control loop with ordered stop conditions.    | [`Supervisor`], [`SupervisorOptions`]                |
//! | **Work API**       | Define work as trait impls, closures, or registered names.               | [`Runnable`], [`RunnableFn`], [`WorkSource`]         |
//! | **Subscriber API** | Hook into lifecycle events (logging, metrics, custom subscribers).       | [`Subscribe`], [`SubscriberSet`]                     |
//! | **Guards**         | Hard watchdog, memory ceiling, fleet restart epoch, veto hooks.          | [`Watchdog`], [`MemoryProbe`], [`EpochStore`]        |
//! | **Errors**         | Typed errors for setup and work execution.                               | [`SuperviseError`], [`WorkError`]                    |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in `LogWriter` subscriber _(demo/reference only)_.
//!
//! ## Example
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use workvisor::{Supervisor, SupervisorOptions, WorkError, WorkSource};
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut opts = SupervisorOptions::default();
//!     opts.timeout = Duration::from_secs(30);
//!     opts.memory_limit_mb = 256;
//!
//!     // Optional: wire up subscribers
//!     #[cfg(feature = "logging")]
//!     let subs: Vec<Arc<dyn workvisor::Subscribe>> = {
//!         use workvisor::LogWriter;
//!         vec![Arc::new(LogWriter::new())]
//!     };
//!     #[cfg(not(feature = "logging"))]
//!     let subs: Vec<Arc<dyn workvisor::Subscribe>> = Vec::new();
//!
//!     let sup = Supervisor::builder(opts).with_subscribers(subs).build();
//!
//!     // One bounded batch per iteration; the loop calls it again forever.
//!     let source = WorkSource::inline("drain-backlog", || async {
//!         // pop one batch, process it...
//!         Ok::<_, WorkError>(())
//!     });
//!
//!     // Never returns normally: the process leaves via exit(0 | 1 | 12).
//!     if let Err(err) = sup.supervise(source).await {
//!         eprintln!("supervisor setup failed: {err}");
//!         std::process::exit(1);
//!     }
//! }
//! ```

mod core;
mod error;
mod events;
mod hooks;
mod probes;
mod report;
mod store;
mod subscribers;
mod work;

// ---- Public re-exports ----

pub use core::{
    spawn_signal_listener, Supervisor, SupervisorBuilder, SupervisorOptions, SupervisorState,
    Watchdog,
};
pub use error::{SuperviseError, WorkError};
pub use events::{exit_code, Bus, Event, EventKind, StopCause};
pub use hooks::LoopHook;
pub use probes::{
    AlwaysUp, FixedMemory, MaintenanceProbe, MaintenanceSwitch, MemoryProbe, SysinfoProbe,
};
pub use report::{ErrorReporter, NullReporter};
pub use store::{EpochStore, MemoryEpochStore, RESTART_EPOCH_KEY};
pub use subscribers::{Subscribe, SubscriberSet};
pub use work::{
    DirectDispatcher, Runnable, RunnableFn, RunnableRef, WorkDispatcher, WorkRegistry, WorkSource,
};

// Optional: expose the simple built-in logger subscriber (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
