//! # Example: supervise_loop
//!
//! The smallest complete worker: one inline runnable supervised forever,
//! with the built-in [`LogWriter`] printing lifecycle events.
//!
//! Shows how to:
//! - Build a [`Supervisor`] with options and subscribers.
//! - Define work as an inline closure ([`WorkSource::inline`]).
//! - Let a run budget (`max_runs`) recycle the process cleanly.
//!
//! While it runs, the loop answers signals:
//! ```bash
//! kill -USR2 <pid>   # pause (iterations skip work)
//! kill -CONT <pid>   # resume
//! kill -TERM <pid>   # stop after the current iteration, exit 0
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example supervise_loop --features logging
//! ```

use std::sync::Arc;
use std::time::Duration;

use workvisor::{LogWriter, Subscribe, Supervisor, SupervisorOptions, WorkError, WorkSource};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let mut opts = SupervisorOptions::default();
    opts.timeout = Duration::from_secs(5);
    opts.max_runs = 5;

    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];
    let sup = Supervisor::builder(opts).with_subscribers(subs).build();

    let source = WorkSource::inline("pulse", || async {
        println!("[pulse] working...");
        tokio::time::sleep(Duration::from_millis(500)).await;
        Ok::<_, WorkError>(())
    });

    println!("supervising 'pulse' for five runs, then a clean exit (code 0)\n");
    let never = sup.supervise(source).await?;
    match never {}
}
