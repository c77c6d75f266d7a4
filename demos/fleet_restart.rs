//! # Example: fleet_restart
//!
//! Coordinated fleet restarts through the shared epoch store: every worker
//! captures the restart epoch at startup and exits cleanly once the value
//! moves, letting a process manager respawn it on the new code.
//!
//! Shows how to:
//! - Register named work in a [`WorkRegistry`] and resolve it by name.
//! - Share a [`MemoryEpochStore`] between the supervisor and "deploy tooling".
//! - Watch the stop through a custom [`Subscribe`] implementation.
//!
//! ## Flow
//! ```text
//! deploy task ── bump(RESTART_EPOCH_KEY) ──► MemoryEpochStore
//!                                                 ▲
//!                                                 │ get() each iteration
//! WorkSource::named("sync-feed") ──► Supervisor ──┘
//!                                        └─► epoch changed ─► exit 0
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example fleet_restart
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use workvisor::{
    Event, EventKind, MemoryEpochStore, RunnableFn, Subscribe, Supervisor, SupervisorOptions,
    WorkError, WorkRegistry, WorkSource, RESTART_EPOCH_KEY,
};

/// Console subscriber printing the handful of events this demo produces.
struct Console;

#[async_trait]
impl Subscribe for Console {
    async fn on_event(&self, ev: &Event) {
        match ev.kind {
            EventKind::RunStarting => {
                println!(
                    "[events] starting: runnable={} iteration={}",
                    ev.runnable.as_deref().unwrap_or("<unknown>"),
                    ev.iteration.unwrap_or(0)
                );
            }
            EventKind::RunFailed => {
                println!(
                    "[events] failed:   reason={}",
                    ev.reason.as_deref().unwrap_or("<none>")
                );
            }
            EventKind::SupervisorStopping => {
                println!(
                    "[events] stopping: cause={} exit_code={}",
                    ev.reason.as_deref().unwrap_or("<unknown>"),
                    ev.exit_code.unwrap_or(0)
                );
            }
            _ => {}
        }
    }

    fn name(&self) -> &'static str {
        "console"
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let store = Arc::new(MemoryEpochStore::new());

    let batches = Arc::new(AtomicU64::new(0));
    let registry = WorkRegistry::default().register("sync-feed", move || {
        let batches = batches.clone();
        RunnableFn::arc("sync-feed", move || {
            let batches = batches.clone();
            async move {
                let n = batches.fetch_add(1, Ordering::SeqCst) + 1;
                println!("[sync-feed] syncing batch {n}");
                tokio::time::sleep(Duration::from_millis(400)).await;
                if n % 3 == 0 {
                    return Err(WorkError::Fail {
                        error: format!("upstream flaked on batch {n}"),
                    });
                }
                Ok(())
            }
        })
    });

    let sup = Supervisor::builder(SupervisorOptions::default())
        .with_registry(registry)
        .with_epoch_store(store.clone())
        .with_subscribers(vec![Arc::new(Console)])
        .build();

    // Stand-in for deploy tooling: bump the shared epoch after a while.
    let deploys = store.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(3)).await;
        let epoch = deploys.bump(RESTART_EPOCH_KEY);
        println!("[deploy] restart epoch bumped to {epoch}");
    });

    println!("worker runs until the restart epoch moves, then exits 0\n");
    let never = sup.supervise(WorkSource::named("sync-feed")).await?;
    match never {}
}
