//! # LogWriter — simple event printer.
//!
//! Prints each incoming [`Event`] as one bracketed line on stdout.
//! Handy in demos and tests.
//!
//! ## Example output
//! ```text
//! [starting] runnable="worker" iteration=1
//! [succeeded] runnable="worker" iteration=1
//! [failed] runnable="worker" iteration=2 err="connection refused"
//! [stopping] cause="quit_requested" exit_code=0
//! [overflow] subscriber="metrics" reason="full"
//! [subscriber-panic] subscriber="metrics" info="..."
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Stdout printer for supervision events.
///
/// Ships behind the `logging` feature. Anything beyond demos wants a
/// custom [`Subscribe`] doing structured logging or metrics instead.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Constructs a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        match e.kind {
            EventKind::RunStarting => {
                println!(
                    "[starting] runnable={:?} iteration={:?}",
                    e.runnable, e.iteration
                );
            }
            EventKind::RunSucceeded => {
                println!(
                    "[succeeded] runnable={:?} iteration={:?}",
                    e.runnable, e.iteration
                );
            }
            EventKind::RunFailed => {
                println!(
                    "[failed] runnable={:?} iteration={:?} err={:?}",
                    e.runnable, e.iteration, e.reason
                );
            }
            EventKind::SupervisorStopping => {
                println!(
                    "[stopping] cause={:?} exit_code={:?}",
                    e.reason, e.exit_code
                );
            }
            EventKind::SubscriberOverflow => {
                println!(
                    "[overflow] subscriber={:?} reason={:?}",
                    e.runnable, e.reason
                );
            }
            EventKind::SubscriberPanicked => {
                println!(
                    "[subscriber-panic] subscriber={:?} info={:?}",
                    e.runnable, e.reason
                );
            }
        }
    }

    fn name(&self) -> &'static str {
        "log"
    }
}
