//! # Supervisor: the one-runnable-per-iteration control loop.
//!
//! The [`Supervisor`] owns the event bus, the [`SubscriberSet`] fan-out, and
//! the injected collaborators (dispatcher, probes, epoch store, reporter,
//! hooks). [`supervise`](Supervisor::supervise) resolves a [`WorkSource`]
//! into a single runnable and drives it forever: one invocation per
//! iteration, watchdog armed around each, stop conditions re-evaluated after
//! every pass.
//!
//! ## Iteration anatomy
//! ```text
//! ┌─► arm watchdog (options.timeout; skipped when disabled)
//! │
//! │   should_run()?
//! │     ├─ yes → run_once(): RunStarting → dispatch → RunSucceeded/RunFailed
//! │     │        disarm watchdog
//! │     └─ no  → disarm watchdog, sleep PAUSE_INTERVAL
//! │
//! │   stop_condition()?
//! │     ├─ None ───────────────────────────────────────────┐
//! │     └─ Some(cause):                                     │
//! │          publish SupervisorStopping { reason, code }    │
//! │          sleep STOP_DRAIN (subscriber queues flush)     │
//! │          std::process::exit(cause.exit_code())          │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Stop conditions (evaluated in order, first match wins)
//! ```text
//! 1. resident memory ≥ options.memory_limit_mb  → MemoryExceeded   exit 12
//! 2. quit requested (signal or programmatic)    → QuitRequested    exit 0
//! 3. restart epoch ≠ value captured at start    → RestartRequested exit 0
//! 4. a loop-completing hook returned false      → HookVeto         exit 0
//! 5. run count ≥ options.max_runs               → RunLimitReached  exit 0
//! 6. alive ≥ options.max_lifetime               → LifetimeReached  exit 0
//! ```
//!
//! ## Rules
//! - At most one runnable invocation is in flight at any time.
//! - The runnable always runs with the watchdog armed (when enabled): a hang
//!   longer than `options.timeout` kills the whole process with exit code 1.
//! - Work failures, contained panics included, never end the loop; they are
//!   reported and published, and the next iteration starts.
//! - Every non-watchdog exit goes through the same door: publish
//!   `SupervisorStopping`, give subscriber queues [`STOP_DRAIN`] to flush,
//!   then `std::process::exit`. The surrounding process manager restarts the
//!   worker on any exit.
//!
//! ## Example
//! ```no_run
//! use workvisor::{Supervisor, SupervisorOptions, WorkError, WorkSource};
//!
//! #[tokio::main]
//! async fn main() {
//!     let sup = Supervisor::builder(SupervisorOptions::default()).build();
//!
//!     let source = WorkSource::inline("drain-backlog", || async {
//!         // take one batch from the backlog...
//!         Ok::<_, WorkError>(())
//!     });
//!
//!     // Never resolves after setup; the process leaves via exit codes.
//!     if let Err(err) = sup.supervise(source).await {
//!         eprintln!("supervisor setup failed: {err}");
//!         std::process::exit(1);
//!     }
//! }
//! ```

use std::convert::Infallible;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

use crate::core::builder::SupervisorBuilder;
use crate::core::options::SupervisorOptions;
use crate::core::runner::run_once;
use crate::core::signals::spawn_signal_listener;
use crate::core::state::SupervisorState;
use crate::core::watchdog::Watchdog;
use crate::error::SuperviseError;
use crate::events::{Bus, Event, EventKind, StopCause};
use crate::hooks::LoopHook;
use crate::probes::{MaintenanceProbe, MemoryProbe};
use crate::report::ErrorReporter;
use crate::store::{EpochStore, RESTART_EPOCH_KEY};
use crate::subscribers::SubscriberSet;
use crate::work::{Runnable, WorkDispatcher, WorkRegistry, WorkSource};

/// Sleep between iterations that skipped work (paused, maintenance, or a
/// beginning-hook veto).
const PAUSE_INTERVAL: Duration = Duration::from_secs(1);

/// Grace given to subscriber queues before the process exits.
const STOP_DRAIN: Duration = Duration::from_millis(150);

/// Wired collaborators handed from [`SupervisorBuilder`] to the supervisor.
pub(crate) struct SupervisorParts {
    pub(crate) options: SupervisorOptions,
    pub(crate) bus: Bus,
    pub(crate) subs: Arc<SubscriberSet>,
    pub(crate) registry: WorkRegistry,
    pub(crate) dispatcher: Arc<dyn WorkDispatcher>,
    pub(crate) epoch_store: Arc<dyn EpochStore>,
    pub(crate) maintenance: Arc<dyn MaintenanceProbe>,
    pub(crate) memory: Arc<dyn MemoryProbe>,
    pub(crate) reporter: Arc<dyn ErrorReporter>,
    pub(crate) hooks: Vec<Arc<dyn LoopHook>>,
}

/// Drives one runnable in an endless supervised loop.
pub struct Supervisor {
    /// Options for this supervision run.
    pub options: SupervisorOptions,
    /// Event bus shared with the runner and the subscriber forwarder.
    pub bus: Bus,
    /// Fan-out set delivering events to subscribers.
    pub subs: Arc<SubscriberSet>,
    registry: WorkRegistry,
    dispatcher: Arc<dyn WorkDispatcher>,
    epoch_store: Arc<dyn EpochStore>,
    maintenance: Arc<dyn MaintenanceProbe>,
    memory: Arc<dyn MemoryProbe>,
    reporter: Arc<dyn ErrorReporter>,
    hooks: Vec<Arc<dyn LoopHook>>,
    iterations: AtomicU64,
    started_at: Instant,
}

impl Supervisor {
    /// Starts building a supervisor with the given options.
    #[must_use]
    pub fn builder(options: SupervisorOptions) -> SupervisorBuilder {
        SupervisorBuilder::new(options)
    }

    pub(crate) fn new_internal(parts: SupervisorParts) -> Self {
        Self {
            options: parts.options,
            bus: parts.bus,
            subs: parts.subs,
            registry: parts.registry,
            dispatcher: parts.dispatcher,
            epoch_store: parts.epoch_store,
            maintenance: parts.maintenance,
            memory: parts.memory,
            reporter: parts.reporter,
            hooks: parts.hooks,
            iterations: AtomicU64::new(0),
            started_at: Instant::now(),
        }
    }

    /// Resolves `source` and supervises it until a stop condition ends the
    /// process.
    ///
    /// Setup failures (unknown runnable name, signal registration, watchdog
    /// thread spawn) return `Err` before the first iteration. Past that
    /// point this future never resolves: every way out is
    /// `std::process::exit`, with the code naming the cause (0 requested
    /// stop, 1 watchdog kill, 12 memory ceiling).
    pub async fn supervise(&self, source: WorkSource) -> Result<Infallible, SuperviseError> {
        let runnable = source.resolve(&self.registry)?;
        let watchdog = Watchdog::spawn()?;

        let state = Arc::new(SupervisorState::new());
        spawn_signal_listener(Arc::clone(&state))
            .map_err(|source| SuperviseError::SignalSetup { source })?;
        state.record_restart_epoch(self.epoch_store.get(RESTART_EPOCH_KEY).await);

        loop {
            if let Some(cause) = self.tick(runnable.as_ref(), &watchdog, &state).await {
                self.stop(cause).await;
            }
        }
    }

    /// Runs one loop iteration and reports whether it ended in a stop cause.
    ///
    /// The watchdog is armed before anything else, so even a hanging
    /// maintenance probe or hook is bounded by `options.timeout`. The pause
    /// path disarms before sleeping; being paused is not a hang.
    async fn tick(
        &self,
        runnable: &dyn Runnable,
        watchdog: &Watchdog,
        state: &SupervisorState,
    ) -> Option<StopCause> {
        if let Some(timeout) = self.options.watchdog_timeout() {
            watchdog.arm(timeout);
        }

        if self.should_run(state).await {
            let iteration = self.iterations.fetch_add(1, Ordering::SeqCst) + 1;
            let _ = run_once(
                runnable,
                self.dispatcher.as_ref(),
                iteration,
                &self.bus,
                self.reporter.as_ref(),
            )
            .await;
            watchdog.disarm();
        } else {
            watchdog.disarm();
            tokio::time::sleep(PAUSE_INTERVAL).await;
        }

        self.stop_condition(state).await
    }

    /// Decides whether this iteration gets to invoke the runnable.
    ///
    /// False when the application is down for maintenance (unless `force`),
    /// when paused, or when any beginning hook vetoes. Hooks run in
    /// registration order and short-circuit on the first `false`.
    async fn should_run(&self, state: &SupervisorState) -> bool {
        if self.maintenance.is_down_for_maintenance().await && !self.options.force {
            return false;
        }
        if state.is_paused() {
            return false;
        }
        for hook in &self.hooks {
            if !hook.loop_beginning().await {
                return false;
            }
        }
        true
    }

    /// Evaluates the ordered stop conditions; `None` keeps the loop going.
    ///
    /// Reads flags and probes only; never mutates state, so re-evaluating
    /// is harmless.
    async fn stop_condition(&self, state: &SupervisorState) -> Option<StopCause> {
        if self.memory.resident_bytes() >= self.options.memory_limit_bytes() {
            return Some(StopCause::MemoryExceeded);
        }
        if state.quit_requested() {
            return Some(StopCause::QuitRequested);
        }
        if self.epoch_store.get(RESTART_EPOCH_KEY).await != state.last_restart_epoch() {
            return Some(StopCause::RestartRequested);
        }
        for hook in &self.hooks {
            if !hook.loop_completing().await {
                return Some(StopCause::HookVeto);
            }
        }
        if let Some(limit) = self.options.run_limit() {
            if self.iterations.load(Ordering::SeqCst) >= limit {
                return Some(StopCause::RunLimitReached);
            }
        }
        if let Some(limit) = self.options.lifetime_limit() {
            if self.started_at.elapsed() >= limit {
                return Some(StopCause::LifetimeReached);
            }
        }
        None
    }

    /// Publishes `SupervisorStopping`, lets subscriber queues flush, and
    /// exits the process with the cause's code.
    async fn stop(&self, cause: StopCause) -> Infallible {
        let code = cause.exit_code();
        self.bus.publish(
            Event::now(EventKind::SupervisorStopping)
                .with_reason(cause.as_label())
                .with_exit_code(code),
        );
        tokio::time::sleep(STOP_DRAIN).await;
        std::process::exit(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WorkError;
    use crate::probes::{FixedMemory, MaintenanceSwitch};
    use crate::store::MemoryEpochStore;
    use async_trait::async_trait;
    use std::sync::atomic::AtomicBool;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Counting {
        runs: AtomicU64,
    }

    #[async_trait]
    impl Runnable for Counting {
        fn name(&self) -> &str {
            "counting"
        }

        async fn run(&self) -> Result<(), WorkError> {
            self.runs.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct Failing;

    #[async_trait]
    impl Runnable for Failing {
        fn name(&self) -> &str {
            "failing"
        }

        async fn run(&self) -> Result<(), WorkError> {
            Err(WorkError::Fail {
                error: "backend unreachable".into(),
            })
        }
    }

    struct Slow;

    #[async_trait]
    impl Runnable for Slow {
        fn name(&self) -> &str {
            "slow"
        }

        async fn run(&self) -> Result<(), WorkError> {
            tokio::time::sleep(Duration::from_millis(200)).await;
            Ok(())
        }
    }

    struct VetoBeginning;

    #[async_trait]
    impl LoopHook for VetoBeginning {
        async fn loop_beginning(&self) -> bool {
            false
        }
    }

    struct VetoCompleting;

    #[async_trait]
    impl LoopHook for VetoCompleting {
        async fn loop_completing(&self) -> bool {
            false
        }
    }

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

    /// Builder with a zeroed memory probe so the real process footprint
    /// cannot trip the memory condition mid-test.
    fn test_builder(options: SupervisorOptions) -> SupervisorBuilder {
        Supervisor::builder(options).with_memory_probe(Arc::new(FixedMemory::new(0)))
    }

    fn quiet_dog() -> Watchdog {
        Watchdog::spawn_with(|| {}).unwrap()
    }

    fn flagged_dog() -> (Watchdog, Arc<AtomicBool>) {
        let fired = Arc::new(AtomicBool::new(false));
        let flag = fired.clone();
        let dog = Watchdog::spawn_with(move || flag.store(true, Ordering::SeqCst)).unwrap();
        (dog, fired)
    }

    #[tokio::test]
    async fn test_quit_stops_after_current_iteration() {
        let sup = test_builder(SupervisorOptions::default()).build();
        let state = SupervisorState::new();
        let dog = quiet_dog();
        let counting = Counting::default();

        state.request_quit();
        let cause = sup.tick(&counting, &dog, &state).await;

        assert_eq!(
            counting.runs.load(Ordering::SeqCst),
            1,
            "the in-flight iteration still runs"
        );
        assert_eq!(cause, Some(StopCause::QuitRequested));
    }

    #[tokio::test]
    async fn test_memory_outranks_quit() {
        let sup = Supervisor::builder(SupervisorOptions::default())
            .with_memory_probe(Arc::new(FixedMemory::new(512 * 1024 * 1024)))
            .build();
        let state = SupervisorState::new();
        let dog = quiet_dog();
        state.request_quit();

        let cause = sup.tick(&Counting::default(), &dog, &state).await;
        assert_eq!(cause, Some(StopCause::MemoryExceeded));
    }

    #[tokio::test]
    async fn test_epoch_change_requests_restart() {
        let store = Arc::new(MemoryEpochStore::new());
        let sup = test_builder(SupervisorOptions::default())
            .with_epoch_store(store.clone())
            .build();
        let state = SupervisorState::new();
        let dog = quiet_dog();
        state.record_restart_epoch(store.get(RESTART_EPOCH_KEY).await);

        assert_eq!(sup.tick(&Counting::default(), &dog, &state).await, None);

        // Deploy tooling bumps the shared epoch.
        store.bump(RESTART_EPOCH_KEY);
        assert_eq!(
            sup.tick(&Counting::default(), &dog, &state).await,
            Some(StopCause::RestartRequested)
        );
    }

    #[tokio::test]
    async fn test_completing_hook_veto_stops() {
        let sup = test_builder(SupervisorOptions::default())
            .with_hooks(vec![Arc::new(VetoCompleting)])
            .build();
        let state = SupervisorState::new();
        let dog = quiet_dog();
        let counting = Counting::default();

        let cause = sup.tick(&counting, &dog, &state).await;
        assert_eq!(counting.runs.load(Ordering::SeqCst), 1);
        assert_eq!(cause, Some(StopCause::HookVeto));
    }

    #[tokio::test(start_paused = true)]
    async fn test_beginning_hook_veto_skips_run() {
        let sup = test_builder(SupervisorOptions::default())
            .with_hooks(vec![Arc::new(VetoBeginning)])
            .build();
        let state = SupervisorState::new();
        let dog = quiet_dog();
        let counting = Counting::default();

        let cause = sup.tick(&counting, &dog, &state).await;
        assert_eq!(
            counting.runs.load(Ordering::SeqCst),
            0,
            "a vetoed iteration must not run"
        );
        assert_eq!(cause, None, "a beginning veto skips, it does not stop");
    }

    #[tokio::test]
    async fn test_run_limit_reached() {
        let sup = test_builder(SupervisorOptions {
            max_runs: 2,
            ..SupervisorOptions::default()
        })
        .build();
        let state = SupervisorState::new();
        let dog = quiet_dog();
        let counting = Counting::default();

        assert_eq!(sup.tick(&counting, &dog, &state).await, None);
        assert_eq!(
            sup.tick(&counting, &dog, &state).await,
            Some(StopCause::RunLimitReached)
        );
        assert_eq!(counting.runs.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_lifetime_reached() {
        let sup = test_builder(SupervisorOptions {
            max_lifetime: Duration::from_secs(300),
            ..SupervisorOptions::default()
        })
        .build();
        let state = SupervisorState::new();
        let dog = quiet_dog();
        let counting = Counting::default();

        assert_eq!(sup.tick(&counting, &dog, &state).await, None);

        tokio::time::advance(Duration::from_secs(301)).await;
        assert_eq!(
            sup.tick(&counting, &dog, &state).await,
            Some(StopCause::LifetimeReached)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_skips_work_and_disarms_watchdog() {
        let sup = test_builder(SupervisorOptions {
            timeout: Duration::from_millis(50),
            ..SupervisorOptions::default()
        })
        .build();
        let state = SupervisorState::new();
        let (dog, fired) = flagged_dog();
        let counting = Counting::default();

        state.pause();
        let cause = sup.tick(&counting, &dog, &state).await;
        assert_eq!(cause, None);
        assert_eq!(counting.runs.load(Ordering::SeqCst), 0);

        // Real-time wait past the armed deadline: the pause path must have
        // disarmed before sleeping.
        std::thread::sleep(Duration::from_millis(150));
        assert!(
            !fired.load(Ordering::SeqCst),
            "paused iteration left the watchdog armed"
        );

        state.resume();
        assert_eq!(sup.tick(&counting, &dog, &state).await, None);
        assert_eq!(
            counting.runs.load(Ordering::SeqCst),
            1,
            "work resumes after the pause clears"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_maintenance_blocks_unless_forced() {
        let gate = Arc::new(MaintenanceSwitch::new());
        gate.set_down(true);

        let sup = test_builder(SupervisorOptions::default())
            .with_maintenance(gate.clone())
            .build();
        let state = SupervisorState::new();
        let dog = quiet_dog();
        let counting = Counting::default();

        assert_eq!(sup.tick(&counting, &dog, &state).await, None);
        assert_eq!(
            counting.runs.load(Ordering::SeqCst),
            0,
            "maintenance downtime blocks work"
        );

        let forced = test_builder(SupervisorOptions {
            force: true,
            ..SupervisorOptions::default()
        })
        .with_maintenance(gate.clone())
        .build();

        assert_eq!(forced.tick(&counting, &dog, &state).await, None);
        assert_eq!(
            counting.runs.load(Ordering::SeqCst),
            1,
            "force runs through maintenance downtime"
        );
    }

    #[tokio::test]
    async fn test_loop_survives_repeated_failures() {
        let reporter = Arc::new(CaptureReporter::default());
        let sup = test_builder(SupervisorOptions::default())
            .with_reporter(reporter.clone())
            .build();
        let state = SupervisorState::new();
        let dog = quiet_dog();

        for _ in 0..3 {
            assert_eq!(sup.tick(&Failing, &dog, &state).await, None);
        }
        assert_eq!(
            *reporter.labels.lock().unwrap(),
            vec!["work_failed", "work_failed", "work_failed"]
        );
    }

    #[tokio::test]
    async fn test_successful_ticks_keep_looping() {
        let sup = test_builder(SupervisorOptions::default()).build();
        let state = SupervisorState::new();
        let dog = quiet_dog();
        let counting = Counting::default();

        for _ in 0..3 {
            assert_eq!(sup.tick(&counting, &dog, &state).await, None);
        }
        assert_eq!(counting.runs.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_watchdog_covers_hung_runs() {
        let sup = test_builder(SupervisorOptions {
            timeout: Duration::from_millis(50),
            ..SupervisorOptions::default()
        })
        .build();
        let state = SupervisorState::new();
        let (dog, fired) = flagged_dog();

        let _ = sup.tick(&Slow, &dog, &state).await;
        assert!(
            fired.load(Ordering::SeqCst),
            "a run outliving the timeout must trip the watchdog"
        );
    }

    #[tokio::test]
    async fn test_supervise_rejects_unknown_name() {
        let sup = test_builder(SupervisorOptions::default()).build();

        let err = sup.supervise(WorkSource::named("ghost")).await.unwrap_err();
        assert_eq!(err.as_label(), "supervise_unknown_runnable");
    }
}
