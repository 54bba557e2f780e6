//! [`SystemController`] – owns every subsystem and exposes the control API.
//!
//! Construction wires explicit `Arc` handles between components rather than
//! relying on any global/singleton state, the way the kernel gate is built
//! from owned `CapabilityManager`/`StateVerifier` instances rather than
//! reaching for statics. `start()` spawns the dedicated simulation thread at
//! a fixed cadence plus lower-cadence worker threads for recovery sweeps and
//! cache cleanup, following the supervisor-loop idiom the kernel watchdog's
//! doc comment describes ("call `check_all` from a supervisor loop"), here
//! with real `std::thread::spawn` loops since genuine concurrency is wanted,
//! not a single-threaded demo.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use swarm_agent::{physics, TickConfig};
use swarm_boundary::BoundaryManager;
use swarm_bus::{EventBus, SubscriptionId};
use swarm_cache::SpatialCache;
use swarm_coordination::{CoordinationManager, FormationKind};
use swarm_hal::AdapterRegistry;
use swarm_monitor::{FrameStats, PerformanceMonitor};
use swarm_recovery::{FailureDetector, FailureKind, RecoveryController};
use swarm_registry::AgentRegistry;
use swarm_types::{
    AgentId, AgentStateSnapshot, EngineConfig, EventKind, FormationId, MovementCommand, Point2, Severity,
    SwarmEvent, SwarmError, Zone, ZoneId,
};
use tracing::{error, info};

use crate::state::{RunFlag, RunState};

const RECOVERY_SWEEP_INTERVAL: Duration = Duration::from_millis(500);
const CACHE_CLEANUP_INTERVAL: Duration = Duration::from_secs(1);
const WORKER_POLL: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, PartialEq)]
pub struct VisualizationUpdate {
    pub agents: Vec<AgentStateSnapshot>,
    pub stats: FrameStats,
}

pub struct SystemController {
    config: EngineConfig,
    bus: EventBus,
    registry: Arc<AgentRegistry>,
    boundary: Arc<BoundaryManager>,
    cache: Arc<SpatialCache>,
    coordination: Arc<CoordinationManager>,
    recovery: Arc<RecoveryController>,
    detector: Arc<FailureDetector>,
    monitor: Arc<PerformanceMonitor>,
    hal: Arc<Mutex<AdapterRegistry>>,
    run_state: Arc<RunFlag>,
    sim_thread: Mutex<Option<JoinHandle<()>>>,
    worker_threads: Mutex<Vec<JoinHandle<()>>>,
    heartbeat_sub: Mutex<Option<SubscriptionId>>,
}

impl SystemController {
    pub fn new(config: EngineConfig) -> Result<Arc<Self>, SwarmError> {
        config.validate().map_err(|_| SwarmError::ConfigInvalid("engine config failed validation".into()))?;

        let bus = EventBus::new();
        let boundary = Arc::new(BoundaryManager::new(
            config.world_width,
            config.world_height,
            swarm_boundary::EnforcementMode::Hard,
            bus.clone(),
        ));
        let cache = Arc::new(SpatialCache::new(
            config.cache_cell_size,
            config.cache_max_entries,
            Duration::from_millis(config.cache_ttl_ms),
        ));
        let registry = Arc::new(AgentRegistry::new(bus.clone(), boundary.clone(), cache.clone()));
        let coordination = Arc::new(CoordinationManager::new(registry.clone()));
        let detector = Arc::new(FailureDetector::new());
        let recovery = Arc::new(
            RecoveryController::new(registry.clone(), coordination.clone(), boundary.clone(), bus.clone())
                .with_limits(config.max_recovery_attempts, Duration::from_millis(config.recovery_timeout_ms)),
        );
        let monitor = Arc::new(PerformanceMonitor::new(bus.clone()));
        let hal = Arc::new(Mutex::new(AdapterRegistry::new()));

        let controller = Arc::new(Self {
            config,
            bus: bus.clone(),
            registry,
            boundary,
            cache,
            coordination,
            recovery,
            detector: detector.clone(),
            monitor,
            hal,
            run_state: Arc::new(RunFlag::new(RunState::Stopped)),
            sim_thread: Mutex::new(None),
            worker_threads: Mutex::new(Vec::new()),
            heartbeat_sub: Mutex::new(None),
        });

        let detector_for_sub = detector;
        let sub = bus.subscribe(EventKind::AgentStateUpdate, move |event| {
            if let SwarmEvent::AgentStateUpdate { id, ts, .. } = event {
                detector_for_sub.heartbeat(*id, *ts);
            }
        });
        *controller.heartbeat_sub.lock() = Some(sub);

        Ok(controller)
    }

    // ---- Control API: lifecycle ------------------------------------------------

    pub fn start(self: &Arc<Self>) {
        if self.run_state.get() != RunState::Stopped {
            return;
        }
        self.run_state.set(RunState::Running);
        info!("system starting");

        let tick_interval = Duration::from_millis(self.config.update_interval_ms.max(1));
        let this = self.clone();
        let sim_handle = std::thread::spawn(move || this.run_simulation_loop(tick_interval));
        *self.sim_thread.lock() = Some(sim_handle);

        let recovery_worker = self.clone();
        let recovery_handle = std::thread::spawn(move || recovery_worker.run_recovery_worker());
        let cache_worker = self.clone();
        let cache_handle = std::thread::spawn(move || cache_worker.run_cache_cleanup_worker());
        *self.worker_threads.lock() = vec![recovery_handle, cache_handle];
    }

    pub fn pause(&self) {
        if self.run_state.get() == RunState::Running {
            self.run_state.set(RunState::Paused);
            info!("system paused");
        }
    }

    pub fn resume(&self) {
        if self.run_state.get() == RunState::Paused {
            self.run_state.set(RunState::Running);
            info!("system resumed");
        }
    }

    /// Signal every loop to exit, then join them. The loops themselves poll
    /// the shared flag at short, bounded intervals, so this join is never
    /// open-ended even without a hard timeout on `JoinHandle::join`.
    pub fn stop(&self) {
        if self.run_state.get() == RunState::Stopped {
            return;
        }
        self.run_state.set(RunState::Stopped);
        if let Some(handle) = self.sim_thread.lock().take() {
            let _ = handle.join();
        }
        for handle in self.worker_threads.lock().drain(..) {
            let _ = handle.join();
        }
        info!("system stopped");
    }

    fn run_simulation_loop(&self, tick_interval: Duration) {
        let tick_cfg = TickConfig {
            command_timeout: Duration::from_millis(self.config.command_timeout_ms),
            arrival_threshold: self.config.arrival_threshold,
        };
        while self.run_state.get() != RunState::Stopped {
            let tick_start = Instant::now();
            if self.run_state.get() == RunState::Running {
                let dt = tick_interval.as_secs_f64();
                let registry = &self.registry;
                let hal = &self.hal;
                let result = catch_unwind(AssertUnwindSafe(|| {
                    registry.tick_all(dt, Utc::now(), &tick_cfg);
                    self.scan_collisions(Utc::now());
                    hal.lock().update_all(dt);
                }));
                if result.is_err() {
                    error!("panic in simulation tick; stopping");
                    self.run_state.set(RunState::Stopped);
                    self.bus.publish(SwarmEvent::system(
                        "SIMULATION_PANIC",
                        Severity::Error,
                        "simulation tick panicked; system stopped",
                        Utc::now(),
                    ));
                    break;
                }
            }
            self.monitor.record_frame(tick_start.elapsed());
            let elapsed = tick_start.elapsed();
            if elapsed < tick_interval {
                std::thread::sleep(tick_interval - elapsed);
            }
        }
    }

    /// Pairwise-scan all agents for positions within `collision_distance`
    /// of each other and report each collided agent to the failure
    /// detector. O(n^2) in agent count; the spatial cache is not used here
    /// since a collision pass needs every pair within the small collision
    /// radius, not a single query's neighborhood.
    fn scan_collisions(&self, now: DateTime<Utc>) {
        let snapshots = self.registry.all_snapshots();
        for i in 0..snapshots.len() {
            for j in (i + 1)..snapshots.len() {
                if physics::collides(snapshots[i].position, snapshots[j].position, self.config.collision_distance) {
                    self.detector.report(snapshots[i].id, FailureKind::Collision, now);
                    self.detector.report(snapshots[j].id, FailureKind::Collision, now);
                }
            }
        }
    }

    fn run_recovery_worker(&self) {
        let mut last_sweep = Instant::now();
        while self.run_state.get() != RunState::Stopped {
            if last_sweep.elapsed() >= RECOVERY_SWEEP_INTERVAL {
                let now = Utc::now();
                self.detector.check_timeouts(now, Duration::from_millis(self.config.heartbeat_timeout_ms));
                for report in self.detector.drain_pending() {
                    let _ = self.recovery.handle(&report);
                }
                self.recovery.sweep_timeouts(now);
                last_sweep = Instant::now();
            }
            std::thread::sleep(WORKER_POLL);
        }
    }

    fn run_cache_cleanup_worker(&self) {
        let mut last_cleanup = Instant::now();
        while self.run_state.get() != RunState::Stopped {
            if last_cleanup.elapsed() >= CACHE_CLEANUP_INTERVAL {
                self.cache.cleanup(Utc::now());
                last_cleanup = Instant::now();
            }
            std::thread::sleep(WORKER_POLL);
        }
    }

    // ---- Control API: agents ----------------------------------------------------

    pub fn spawn_agent(&self, x: f64, y: f64) -> AgentId {
        self.registry.create_agent(Point2::new(x, y))
    }

    pub fn remove_agent(&self, id: AgentId) -> Result<(), SwarmError> {
        self.detector.forget(id);
        self.registry.remove_agent(id).map_err(|e| SwarmError::NotFound(e.to_string()))
    }

    pub fn submit_command(&self, command: MovementCommand) -> Result<(), SwarmError> {
        self.registry.submit_command(command).map_err(|e| SwarmError::NotFound(e.to_string()))
    }

    pub fn snapshot(&self) -> VisualizationUpdate {
        VisualizationUpdate { agents: self.registry.all_snapshots(), stats: self.monitor.stats() }
    }

    pub fn run_state(&self) -> RunState {
        self.run_state.get()
    }

    // ---- Control API: event bus -------------------------------------------------

    pub fn subscribe<F>(&self, kind: EventKind, handler: F) -> SubscriptionId
    where
        F: Fn(&SwarmEvent) + Send + Sync + 'static,
    {
        self.bus.subscribe(kind, handler)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.bus.unsubscribe(id);
    }

    // ---- Control API: world and zones -------------------------------------------

    pub fn set_world_bounds(&self, min_x: f64, min_y: f64, max_x: f64, max_y: f64) {
        self.boundary.set_world_bounds(min_x, min_y, max_x, max_y);
    }

    pub fn add_zone(&self, id: ZoneId, zone: Zone) {
        self.boundary.add_zone(id, zone);
    }

    pub fn remove_zone(&self, id: ZoneId) {
        self.boundary.remove_zone(id);
    }

    // ---- Control API: formations and queries ------------------------------------

    pub fn create_formation(
        &self,
        kind: FormationKind,
        ids: Vec<AgentId>,
        center: Point2,
        spacing: f64,
    ) -> Result<FormationId, SwarmError> {
        self.coordination.create_formation(kind, ids, center, spacing).map_err(|e| SwarmError::InvalidArgument(e.to_string()))
    }

    pub fn query_nearby(&self, center: Point2, radius: f64) -> Vec<AgentId> {
        self.cache.nearby(center, radius, Utc::now())
    }

    // ---- hardware adapters -------------------------------------------------------

    pub fn hal(&self) -> Arc<Mutex<AdapterRegistry>> {
        self.hal.clone()
    }
}
