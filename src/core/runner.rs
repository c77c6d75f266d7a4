//! # Run a single invocation of the supervised runnable.
//!
//! Executes one invocation through the [`WorkDispatcher`], containing
//! panics, reporting failures, and publishing lifecycle events to the
//! [`Bus`].
//!
//! ## Event flow
//! ```text
//! Start:
//!   publish RunStarting
//!
//! Success:
//!   dispatch() → Ok(()) → publish RunSucceeded
//!
//! Failure:
//!   dispatch() → Err(e) → reporter.report(e) → publish RunFailed
//!
//! Panic:
//!   dispatch() panics → caught → WorkError::Panicked
//!                     → reporter.report(e) → publish RunFailed
//! ```
//!
//! ## Rules
//! - Always publishes **exactly one** terminal event: `RunSucceeded` or
//!   `RunFailed`.
//! - Panics never cross this boundary: `catch_unwind` converts them into
//!   [`WorkError::Panicked`].
//! - The returned `Result` is informational; the caller has no follow-up
//!   duty, reporting and publishing already happened here.

use futures::FutureExt;

use crate::error::WorkError;
use crate::events::{Bus, Event, EventKind};
use crate::report::ErrorReporter;
use crate::work::{Runnable, WorkDispatcher};

/// Executes a single invocation of `runnable`, publishing lifecycle events
/// to `bus`.
///
/// ### Flow
/// 1. Publish `RunStarting`
/// 2. Dispatch the runnable with panic containment
/// 3. Report the failure (if any), publish the terminal event
///
/// ### Panic semantics
/// The dispatch future runs under `catch_unwind` (`AssertUnwindSafe`): a
/// panicking runnable is converted to [`WorkError::Panicked`] and treated
/// like any other failed invocation.
pub async fn run_once(
    runnable: &dyn Runnable,
    dispatcher: &dyn WorkDispatcher,
    iteration: u64,
    bus: &Bus,
    reporter: &dyn ErrorReporter,
) -> Result<(), WorkError> {
    let name = runnable.name().to_string();
    publish_starting(bus, &name, iteration);

    let fut = dispatcher.dispatch(runnable);
    let outcome = std::panic::AssertUnwindSafe(fut).catch_unwind().await;

    match outcome {
        Ok(Ok(())) => {
            publish_succeeded(bus, &name, iteration);
            Ok(())
        }
        Ok(Err(e)) => {
            reporter.report(&e).await;
            publish_failed(bus, &name, iteration, &e);
            Err(e)
        }
        Err(payload) => {
            let e = WorkError::from_panic(payload);
            reporter.report(&e).await;
            publish_failed(bus, &name, iteration, &e);
            Err(e)
        }
    }
}

/// Publishes `RunStarting`.
fn publish_starting(bus: &Bus, name: &str, iteration: u64) {
    bus.publish(
        Event::now(EventKind::RunStarting)
            .with_runnable(name)
            .with_iteration(iteration),
    );
}

/// Publishes `RunSucceeded`.
fn publish_succeeded(bus: &Bus, name: &str, iteration: u64) {
    bus.publish(
        Event::now(EventKind::RunSucceeded)
            .with_runnable(name)
            .with_iteration(iteration),
    );
}

/// Publishes `RunFailed` with failure details.
fn publish_failed(bus: &Bus, name: &str, iteration: u64, err: &WorkError) {
    bus.publish(
        Event::now(EventKind::RunFailed)
            .with_runnable(name)
            .with_iteration(iteration)
            .with_reason(err.to_string()),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::NullReporter;
    use crate::work::{DirectDispatcher, RunnableFn};
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct CaptureReporter {
        labels: Mutex<Vec<&'static str>>,
    }

    #[async_trait]
    impl ErrorReporter for CaptureReporter {
        async fn report(&self, error: &WorkError) {
            self.labels.lock().unwrap().push(error.as_label());
        }
    }

    struct Explosive;

    #[async_trait]
    impl Runnable for Explosive {
        fn name(&self) -> &str {
            "explosive"
        }

        async fn run(&self) -> Result<(), WorkError> {
            panic!("boom")
        }
    }

    #[tokio::test]
    async fn test_success_publishes_start_then_succeeded() {
        let bus = Bus::new(8);
        let mut rx = bus.subscribe();
        let runnable = RunnableFn::new("ok", || async { Ok::<_, WorkError>(()) });

        let res = run_once(&runnable, &DirectDispatcher, 1, &bus, &NullReporter).await;
        assert!(res.is_ok());

        let starting = rx.recv().await.unwrap();
        let succeeded = rx.recv().await.unwrap();
        assert_eq!(starting.kind, EventKind::RunStarting);
        assert_eq!(starting.runnable.as_deref(), Some("ok"));
        assert_eq!(starting.iteration, Some(1));
        assert_eq!(succeeded.kind, EventKind::RunSucceeded);
        assert!(starting.seq < succeeded.seq);
    }

    #[tokio::test]
    async fn test_failure_is_reported_and_published() {
        let bus = Bus::new(8);
        let mut rx = bus.subscribe();
        let reporter = CaptureReporter::default();
        let runnable = RunnableFn::new("bad", || async {
            Err::<(), _>(WorkError::Fail {
                error: "disk full".into(),
            })
        });

        let res = run_once(&runnable, &DirectDispatcher, 3, &bus, &reporter).await;
        assert!(res.is_err());
        assert_eq!(*reporter.labels.lock().unwrap(), vec!["work_failed"]);

        let starting = rx.recv().await.unwrap();
        assert_eq!(starting.kind, EventKind::RunStarting);
        let failed = rx.recv().await.unwrap();
        assert_eq!(failed.kind, EventKind::RunFailed);
        assert_eq!(failed.iteration, Some(3));
        assert!(failed.reason.as_deref().unwrap().contains("disk full"));
    }

    #[tokio::test]
    async fn test_panic_is_contained() {
        let bus = Bus::new(8);
        let mut rx = bus.subscribe();
        let reporter = CaptureReporter::default();

        let res = run_once(&Explosive, &DirectDispatcher, 1, &bus, &reporter).await;
        let err = res.unwrap_err();
        assert!(err.is_panic());
        assert_eq!(*reporter.labels.lock().unwrap(), vec!["work_panicked"]);

        let _starting = rx.recv().await.unwrap();
        let failed = rx.recv().await.unwrap();
        assert_eq!(failed.kind, EventKind::RunFailed);
        assert!(failed.reason.as_deref().unwrap().contains("boom"));
    }
}
