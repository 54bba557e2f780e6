//! Per-agent tick: drain the command queue, execute the active command,
//! integrate physics, enforce boundaries, deplete battery, and publish.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use swarm_bus::EventBus;
use swarm_boundary::BoundaryManager;
use swarm_cache::SpatialCache;
use swarm_types::{
    AgentStatus, CommandKind, CompletionStatus, MovementCommand, ParamValue, Point2, SwarmEvent,
    TaskCompletionReport, UpdateKind, Vec2,
};

use crate::error::AgentError;
use crate::physics;
use crate::queue::CommandQueue;
use crate::state::AgentState;

/// Battery drain coefficient applied to `(|velocity| / max_speed) * K * dt`.
pub const BATTERY_DRAIN_K: f64 = 0.001;

/// Battery fraction below which an `ACTIVE` agent transitions to
/// `BATTERY_LOW`.
pub const BATTERY_LOW_THRESHOLD: f64 = 0.2;

#[derive(Debug, Clone)]
pub struct TickConfig {
    pub command_timeout: Duration,
    pub arrival_threshold: f64,
}

impl Default for TickConfig {
    fn default() -> Self {
        Self { command_timeout: Duration::from_secs(30), arrival_threshold: 5.0 }
    }
}

struct DispatchOutcome {
    velocity: Vec2,
    /// Set when the command persists until the agent arrives within
    /// `arrival_threshold` of this point (`MOVE_TO_TARGET`,
    /// `FORMATION_POSITION`).
    arrival_target: Option<Point2>,
    /// Set when the command completes in the same tick it was dispatched
    /// (`FLOCKING`, `AVOID_OBSTACLE`).
    immediate: Option<CompletionStatus>,
}

fn point_param<'a>(params: &'a swarm_types::Params, key: &str) -> Option<&'a Point2> {
    match params.get(key) {
        Some(ParamValue::Point(p)) => Some(p),
        _ => None,
    }
}

fn vector_param<'a>(params: &'a swarm_types::Params, key: &str) -> Option<&'a Vec2> {
    match params.get(key) {
        Some(ParamValue::Vector(v)) => Some(v),
        _ => None,
    }
}

fn dispatch(state: &AgentState, cmd: &MovementCommand) -> Result<DispatchOutcome, AgentError> {
    match cmd.kind {
        CommandKind::MoveToTarget => {
            let target = point_param(&cmd.params, "target")
                .ok_or_else(|| AgentError::MissingParam("target".into()))?;
            let force = physics::seek(state.position, state.velocity, *target, state.limits.max_speed);
            Ok(DispatchOutcome { velocity: state.velocity + force, arrival_target: Some(*target), immediate: None })
        }
        CommandKind::FormationPosition => {
            let target = point_param(&cmd.params, "formation_pos")
                .ok_or_else(|| AgentError::MissingParam("formation_pos".into()))?;
            let force = physics::seek(state.position, state.velocity, *target, state.limits.max_speed);
            Ok(DispatchOutcome { velocity: state.velocity + force, arrival_target: Some(*target), immediate: None })
        }
        CommandKind::Flocking => {
            let force = vector_param(&cmd.params, "combined_force")
                .ok_or_else(|| AgentError::MissingParam("combined_force".into()))?;
            Ok(DispatchOutcome {
                velocity: state.velocity + *force,
                arrival_target: None,
                immediate: Some(CompletionStatus::Success),
            })
        }
        CommandKind::AvoidObstacle => {
            let velocity = if let Some(force) = vector_param(&cmd.params, "avoidance_force") {
                state.velocity + *force
            } else {
                let obstacle = point_param(&cmd.params, "obstacle")
                    .ok_or_else(|| AgentError::MissingParam("obstacle".into()))?;
                state.velocity + physics::flee(state.position, state.velocity, *obstacle, state.limits.max_speed)
            };
            Ok(DispatchOutcome { velocity, arrival_target: None, immediate: Some(CompletionStatus::Success) })
        }
    }
}

/// Advance `state` by one tick. Publishes `AgentStateUpdate` and, if a
/// command completed or timed out, a `TaskCompletionReport`, through `bus`.
pub fn tick_agent(
    state: &mut AgentState,
    queue: &CommandQueue,
    dt: f64,
    now: DateTime<Utc>,
    cfg: &TickConfig,
    boundary: &BoundaryManager,
    cache: &SpatialCache,
    bus: &EventBus,
) {
    let timeout_ms = cfg.command_timeout.as_millis() as i64;
    while state.current_command.is_none() {
        match queue.pop() {
            Some(cmd) => {
                if cmd.age_ms(now) > timeout_ms {
                    publish_report(bus, TaskCompletionReport::new(cmd.task_id, state.id, CompletionStatus::Timeout, 0.0));
                    continue;
                }
                state.current_command = Some(cmd);
            }
            None => break,
        }
    }

    let mut completion: Option<CompletionStatus> = None;
    let mut completed_task_id = None;

    if let Some(cmd) = state.current_command.clone() {
        match dispatch(state, &cmd) {
            Ok(outcome) => {
                state.velocity = outcome.velocity;
                if let Some(status) = outcome.immediate {
                    completion = Some(status);
                    completed_task_id = cmd.task_id;
                } else if let Some(target) = outcome.arrival_target {
                    if state.position.distance(target) < cfg.arrival_threshold {
                        completion = Some(CompletionStatus::Success);
                        completed_task_id = cmd.task_id;
                    }
                }
            }
            Err(_) => {
                completion = Some(CompletionStatus::Failed);
                completed_task_id = cmd.task_id;
            }
        }
    }

    let (position, velocity) = physics::integrate(state.position, state.velocity, dt);
    let velocity = physics::limit_velocity(velocity, state.limits.max_speed);
    let enforced = boundary.enforce(state.id, position, velocity);
    state.position = enforced.position;
    state.velocity = enforced.velocity;

    let drain = (state.velocity.length() / state.limits.max_speed) * BATTERY_DRAIN_K * dt;
    state.battery = (state.battery - drain).clamp(0.0, 1.0);
    if state.battery <= 0.0 {
        state.status = AgentStatus::Failed;
        state.velocity = Vec2::ZERO;
    } else if state.battery < BATTERY_LOW_THRESHOLD && state.status == AgentStatus::Active {
        state.status = AgentStatus::BatteryLow;
    }

    state.last_update_ts = now;
    if completion.is_some() {
        state.current_command = None;
    }

    cache.put(state.id, state.snapshot(), now);
    bus.publish(SwarmEvent::AgentStateUpdate {
        id: state.id,
        snapshot: state.snapshot(),
        update_kind: UpdateKind::Full,
        ts: now,
    });

    if let Some(status) = completion {
        publish_report(bus, TaskCompletionReport::new(completed_task_id, state.id, status, 0.0));
    }
}

fn publish_report(bus: &EventBus, report: TaskCompletionReport) {
    bus.publish(SwarmEvent::TaskCompletionReport {
        task_id: report.task_id,
        agent_id: report.agent_id,
        status: report.status,
        duration: report.duration_s,
        results: HashMap::new(),
    });
}
