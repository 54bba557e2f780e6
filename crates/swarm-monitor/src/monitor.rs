//! [`PerformanceMonitor`]: frame-time ring buffer, fps statistics, and
//! tier-based optimization hints.
//!
//! Grounded on the summoner's `PerformanceMonitor`: a `parking_lot::RwLock`-
//! guarded stats struct fed by a `record_step`-shaped call, with the ring
//! buffer capped rather than left to grow unbounded.

use std::collections::VecDeque;
use std::time::Duration;

use chrono::Utc;
use parking_lot::RwLock;
use swarm_bus::EventBus;
use swarm_types::{Severity, SwarmEvent};
use tracing::info;

const DEFAULT_WINDOW: usize = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Tier {
    Optimal,
    Normal,
    Degraded,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptimizationHint {
    None,
    Light,
    Moderate,
    Aggressive,
}

impl Tier {
    fn from_fps_and_memory(fps: f64, memory_ratio: f64) -> Tier {
        if fps >= 50.0 && memory_ratio < 0.7 {
            Tier::Optimal
        } else if fps >= 30.0 && memory_ratio < 0.8 {
            Tier::Normal
        } else if fps >= 20.0 && memory_ratio < 0.9 {
            Tier::Degraded
        } else {
            Tier::Critical
        }
    }

    pub fn optimization_hint(self) -> OptimizationHint {
        match self {
            Tier::Optimal => OptimizationHint::None,
            Tier::Normal => OptimizationHint::Light,
            Tier::Degraded => OptimizationHint::Moderate,
            Tier::Critical => OptimizationHint::Aggressive,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameStats {
    pub current_fps: f64,
    pub avg_fps: f64,
    pub min_fps: f64,
    pub max_fps: f64,
    pub memory_ratio: f64,
    pub tier: Tier,
}

struct Inner {
    frame_times: VecDeque<Duration>,
    window: usize,
    memory_ratio: f64,
    last_tier: Option<Tier>,
}

pub struct PerformanceMonitor {
    inner: RwLock<Inner>,
    bus: EventBus,
}

impl PerformanceMonitor {
    pub fn new(bus: EventBus) -> Self {
        Self::with_window(bus, DEFAULT_WINDOW)
    }

    pub fn with_window(bus: EventBus, window: usize) -> Self {
        Self {
            inner: RwLock::new(Inner {
                frame_times: VecDeque::with_capacity(window),
                window,
                memory_ratio: 0.0,
                last_tier: None,
            }),
            bus,
        }
    }

    pub fn set_memory_ratio(&self, ratio: f64) {
        self.inner.write().memory_ratio = ratio.clamp(0.0, 1.0);
    }

    /// Record one completed tick's frame time. Publishes
    /// `PERFORMANCE_STATUS_CHANGED` only when the computed tier differs
    /// from the previous call's tier.
    pub fn record_frame(&self, frame_time: Duration) {
        let mut inner = self.inner.write();
        if inner.frame_times.len() == inner.window {
            inner.frame_times.pop_front();
        }
        inner.frame_times.push_back(frame_time);

        let stats = Self::compute_locked(&inner);
        let changed = inner.last_tier != Some(stats.tier);
        inner.last_tier = Some(stats.tier);
        drop(inner);

        if changed {
            info!(tier = ?stats.tier, fps = stats.current_fps, "performance tier changed");
            self.bus.publish(SwarmEvent::system(
                "PERFORMANCE_STATUS_CHANGED",
                Severity::Info,
                format!("tier -> {:?}", stats.tier),
                Utc::now(),
            ));
        }
    }

    fn compute_locked(inner: &Inner) -> FrameStats {
        if inner.frame_times.is_empty() {
            return FrameStats {
                current_fps: 0.0,
                avg_fps: 0.0,
                min_fps: 0.0,
                max_fps: 0.0,
                memory_ratio: inner.memory_ratio,
                tier: Tier::Critical,
            };
        }
        let secs: Vec<f64> = inner.frame_times.iter().map(Duration::as_secs_f64).collect();
        let to_fps = |s: f64| if s > 0.0 { 1.0 / s } else { f64::INFINITY };

        let current_fps = to_fps(*secs.last().unwrap());
        let avg_secs = secs.iter().sum::<f64>() / secs.len() as f64;
        let avg_fps = to_fps(avg_secs);
        // The *slowest* frame yields the *lowest* fps, and vice versa.
        let max_secs = secs.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let min_secs = secs.iter().cloned().fold(f64::INFINITY, f64::min);
        let min_fps = to_fps(max_secs);
        let max_fps = to_fps(min_secs);

        FrameStats {
            current_fps,
            avg_fps,
            min_fps,
            max_fps,
            memory_ratio: inner.memory_ratio,
            tier: Tier::from_fps_and_memory(avg_fps, inner.memory_ratio),
        }
    }

    pub fn stats(&self) -> FrameStats {
        Self::compute_locked(&self.inner.read())
    }

    pub fn optimization_hint(&self) -> OptimizationHint {
        self.stats().tier.optimization_hint()
    }
}
