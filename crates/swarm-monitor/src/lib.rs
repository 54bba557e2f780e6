//! Frame-time performance tracking and optimization-tier hints.

mod monitor;

pub use monitor::{FrameStats, OptimizationHint, PerformanceMonitor, Tier};
