//! # Builder wiring for the supervisor.
//!
//! [`SupervisorBuilder`] collects options and collaborators, fills in
//! defaults for everything not provided, and assembles the runtime pieces:
//! the event bus, the subscriber workers, and the bus→set forwarder task.
//!
//! ## Defaults
//! - dispatcher: [`DirectDispatcher`] (invoke the runnable in place)
//! - epoch store: empty [`MemoryEpochStore`]
//! - maintenance probe: [`AlwaysUp`]
//! - memory probe: [`SysinfoProbe`] for the current process
//! - reporter: [`NullReporter`]
//! - subscribers, hooks: none
//! - bus capacity: 1024 events

use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;

use crate::core::options::SupervisorOptions;
use crate::core::supervisor::{Supervisor, SupervisorParts};
use crate::events::Bus;
use crate::hooks::LoopHook;
use crate::probes::{AlwaysUp, MaintenanceProbe, MemoryProbe, SysinfoProbe};
use crate::report::{ErrorReporter, NullReporter};
use crate::store::{EpochStore, MemoryEpochStore};
use crate::subscribers::{Subscribe, SubscriberSet};
use crate::work::{DirectDispatcher, WorkDispatcher, WorkRegistry};

/// Default broadcast capacity between the runner and the forwarder.
const DEFAULT_BUS_CAPACITY: usize = 1024;

/// Builder for constructing a [`Supervisor`] with injected collaborators.
///
/// Obtained through [`Supervisor::builder`]; every `with_*` call replaces
/// the corresponding default.
pub struct SupervisorBuilder {
    options: SupervisorOptions,
    subscribers: Vec<Arc<dyn Subscribe>>,
    hooks: Vec<Arc<dyn LoopHook>>,
    registry: WorkRegistry,
    dispatcher: Arc<dyn WorkDispatcher>,
    epoch_store: Arc<dyn EpochStore>,
    maintenance: Arc<dyn MaintenanceProbe>,
    memory: Arc<dyn MemoryProbe>,
    reporter: Arc<dyn ErrorReporter>,
    bus_capacity: usize,
}

impl SupervisorBuilder {
    /// Creates a builder with the given options and default collaborators.
    #[must_use]
    pub fn new(options: SupervisorOptions) -> Self {
        Self {
            options,
            subscribers: Vec::new(),
            hooks: Vec::new(),
            registry: WorkRegistry::default(),
            dispatcher: Arc::new(DirectDispatcher),
            epoch_store: Arc::new(MemoryEpochStore::new()),
            maintenance: Arc::new(AlwaysUp),
            memory: Arc::new(SysinfoProbe::current()),
            reporter: Arc::new(NullReporter),
            bus_capacity: DEFAULT_BUS_CAPACITY,
        }
    }

    /// Installs the event subscribers.
    ///
    /// Subscribers receive lifecycle events through dedicated workers with
    /// bounded queues; a slow subscriber loses events instead of stalling
    /// the loop.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Sets the ordered veto hooks consulted at iteration boundaries.
    pub fn with_hooks(mut self, hooks: Vec<Arc<dyn LoopHook>>) -> Self {
        self.hooks = hooks;
        self
    }

    /// Sets the registry used to resolve named work sources.
    pub fn with_registry(mut self, registry: WorkRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Sets the dispatcher the runner invokes runnables through.
    pub fn with_dispatcher(mut self, dispatcher: Arc<dyn WorkDispatcher>) -> Self {
        self.dispatcher = dispatcher;
        self
    }

    /// Sets the shared store polled for the restart epoch.
    pub fn with_epoch_store(mut self, store: Arc<dyn EpochStore>) -> Self {
        self.epoch_store = store;
        self
    }

    /// Sets the probe deciding whether the application is down for
    /// maintenance.
    pub fn with_maintenance(mut self, probe: Arc<dyn MaintenanceProbe>) -> Self {
        self.maintenance = probe;
        self
    }

    /// Sets the probe reporting resident memory.
    pub fn with_memory_probe(mut self, probe: Arc<dyn MemoryProbe>) -> Self {
        self.memory = probe;
        self
    }

    /// Sets the reporter notified of every work failure.
    pub fn with_reporter(mut self, reporter: Arc<dyn ErrorReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Sets the event bus capacity (clamped to at least 1).
    pub fn with_bus_capacity(mut self, capacity: usize) -> Self {
        self.bus_capacity = capacity;
        self
    }

    /// Builds and returns the supervisor.
    ///
    /// Initializes the event bus, spawns the subscriber workers, and spawns
    /// the bus→set forwarder. Must be called inside a tokio runtime.
    pub fn build(self) -> Arc<Supervisor> {
        let bus = Bus::new(self.bus_capacity);
        let subs = Arc::new(SubscriberSet::new(self.subscribers, bus.clone()));
        spawn_subscriber_listener(&bus, Arc::clone(&subs));

        Arc::new(Supervisor::new_internal(SupervisorParts {
            options: self.options,
            bus,
            subs,
            registry: self.registry,
            dispatcher: self.dispatcher,
            epoch_store: self.epoch_store,
            maintenance: self.maintenance,
            memory: self.memory,
            reporter: self.reporter,
            hooks: self.hooks,
        }))
    }
}

/// Subscribes to the bus and forwards events into the subscriber queues
/// (fire-and-forget).
fn spawn_subscriber_listener(bus: &Bus, set: Arc<SubscriberSet>) {
    let mut rx = bus.subscribe();
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(ev) => set.emit(&ev),
                Err(RecvError::Closed) => break,
                // Lagged events are lost to subscribers; keep forwarding.
                Err(RecvError::Lagged(_)) => continue,
            }
        }
    });
}
