//! Steering behaviours.
//!
//! Each tick every vehicle evaluates a small set of weighted goals against a
//! read-only snapshot of the other vehicles and the traffic lights. The goals
//! are blended into a single acceleration by [compose]. Nothing here mutates
//! simulation state, so the order in which vehicles are steered does not matter.

use crate::config::LightPolicy;
use crate::light::LightState;
use crate::math::{clamp_magnitude, direction, Point2d, Vector2d};
use crate::{VehicleId, VehicleKind};
use cgmath::prelude::*;
use smallvec::SmallVec;

/// Vehicles slower than this steer by the direction of their waypoint
/// rather than their velocity when deciding which lights are ahead.
const MIN_HEADING_SPEED: f64 = 0.5;

/// Vehicles start slowing down this far from the end of their route.
const ARRIVAL_SLOWING_DISTANCE: f64 = 20.0;

/// The fraction of its top speed a vehicle slows to for a yellow light.
const YELLOW_SPEED_FACTOR: f64 = 0.3;

/// A read-only snapshot of a vehicle.
#[derive(Clone, Copy, Debug)]
pub struct Agent {
    pub id: VehicleId,
    pub kind: VehicleKind,
    pub position: Point2d,
    pub velocity: Vector2d,
}

/// A traffic light as seen by a steering agent.
#[derive(Clone, Copy, Debug)]
pub struct Signal {
    pub position: Point2d,
    pub state: LightState,
    pub influence_radius: f64,
}

/// The waypoint an agent is steering towards.
#[derive(Clone, Copy, Debug)]
pub struct Waypoint {
    /// The waypoint's position.
    pub position: Point2d,
    /// The road leading to the waypoint, if the agent is on one.
    pub road: Option<Road>,
    /// Whether the waypoint is the end of the route.
    pub is_destination: bool,
}

/// The road segment an agent is travelling along.
#[derive(Clone, Copy, Debug)]
pub struct Road {
    /// A unit vector in the direction of travel.
    pub direction: Vector2d,
    /// The speed limit of the road.
    pub speed_limit: f64,
}

/// The kinds of steering goal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GoalKind {
    /// Drive towards the next waypoint.
    Seek,
    /// Come to rest; used when the agent has nowhere to go.
    Hold,
    /// Keep away from nearby agents.
    Separation,
    /// Stop for a red light.
    RedLight,
    /// Slow down for a yellow light.
    YellowLight,
    /// Line the velocity up with the road.
    Alignment,
}

/// An active steering goal.
#[derive(Clone, Copy, Debug)]
pub struct Goal {
    pub kind: GoalKind,
    pub weight: f64,
    /// The unweighted steering force.
    pub force: Vector2d,
}

/// The active goals of one agent.
pub type Goals = SmallVec<[Goal; 6]>;

/// Parameters shared by all agents.
#[derive(Clone, Copy, Debug)]
pub struct SteeringParams {
    /// Agents closer than this push each other apart.
    pub avoidance_radius: f64,
    /// How red lights are combined with the other goals.
    pub light_policy: LightPolicy,
}

impl GoalKind {
    /// The weight the goal carries in the blend.
    pub fn weight(self) -> f64 {
        match self {
            GoalKind::Seek | GoalKind::Hold => 1.0,
            GoalKind::Separation => 2.0,
            GoalKind::RedLight => 5.0,
            GoalKind::YellowLight => 3.0,
            GoalKind::Alignment => 0.5,
        }
    }
}

impl Agent {
    /// The agent's collision radius.
    pub fn radius(&self) -> f64 {
        self.kind.radius()
    }
}

/// Computes the acceleration of `agent` for this tick.
///
/// # Parameters
/// * `agent` - The agent being steered
/// * `waypoint` - The agent's next waypoint, if it has one
/// * `neighbors` - Snapshot of other agents; the agent itself and those out of range are ignored
/// * `signals` - Snapshot of the traffic lights; those out of range or behind the agent are ignored
/// * `params` - Shared steering parameters
pub fn compose(
    agent: &Agent,
    waypoint: Option<Waypoint>,
    neighbors: &[Agent],
    signals: &[Signal],
    params: &SteeringParams,
) -> Vector2d {
    let goals = evaluate_goals(agent, waypoint, neighbors, signals, params);
    blend(agent.kind, &goals, params.light_policy)
}

/// Determines which goals are active for `agent` and the force each exerts.
pub fn evaluate_goals(
    agent: &Agent,
    waypoint: Option<Waypoint>,
    neighbors: &[Agent],
    signals: &[Signal],
    params: &SteeringParams,
) -> Goals {
    let mut goals = Goals::new();
    let mut push = |kind: GoalKind, force: Vector2d| {
        goals.push(Goal {
            kind,
            weight: kind.weight(),
            force,
        })
    };

    let max_speed = agent.kind.max_speed();
    let vel = agent.velocity;

    match waypoint {
        Some(waypoint) => {
            let offset = waypoint.position - agent.position;
            let mut speed = waypoint
                .road
                .map_or(max_speed, |road| f64::min(max_speed, road.speed_limit));
            if waypoint.is_destination {
                speed *= f64::min(1.0, offset.magnitude() / ARRIVAL_SLOWING_DISTANCE);
            }
            if let Some(dir) = direction(offset) {
                push(GoalKind::Seek, dir * speed - vel);
            }
            if let Some(road) = waypoint.road {
                push(GoalKind::Alignment, road.direction * vel.magnitude() - vel);
            }
        }
        None => push(GoalKind::Hold, -vel),
    }

    if let Some(force) = separation(agent, neighbors, params.avoidance_radius) {
        push(GoalKind::Separation, force);
    }

    if !agent.kind.ignores_lights() {
        match strictest_signal(agent, waypoint, signals) {
            Some(LightState::Red) => push(GoalKind::RedLight, -vel),
            Some(LightState::Yellow) => {
                let target = YELLOW_SPEED_FACTOR * max_speed;
                if let Some(dir) = direction(vel).filter(|_| vel.magnitude() > target) {
                    push(GoalKind::YellowLight, dir * target - vel);
                }
            }
            _ => {}
        }
    }

    goals
}

/// Sums the weighted goal forces and converts the result to an acceleration,
/// clamped to the largest acceleration the vehicle kind can manage.
pub fn blend(kind: VehicleKind, goals: &[Goal], policy: LightPolicy) -> Vector2d {
    let red = goals.iter().any(|goal| goal.kind == GoalKind::RedLight);
    let force = goals
        .iter()
        .filter(|goal| !red || policy == LightPolicy::Additive || goal.kind == GoalKind::RedLight)
        .fold(Vector2d::zero(), |sum, goal| sum + goal.force * goal.weight);
    clamp_magnitude(force / kind.mass(), kind.max_acceleration())
}

/// The separation force: each neighbour within `radius` pushes the agent directly
/// away from it with a strength of `radius - distance`, averaged over the neighbours.
fn separation(agent: &Agent, neighbors: &[Agent], radius: f64) -> Option<Vector2d> {
    let mut sum = Vector2d::zero();
    let mut count = 0;
    for other in neighbors.iter().filter(|other| other.id != agent.id) {
        let offset = agent.position - other.position;
        let dist = offset.magnitude();
        if !(dist < radius) {
            continue;
        }
        // Agents on top of each other split along the x axis
        let dir = direction(offset).unwrap_or_else(|| {
            if agent.id < other.id {
                -Vector2d::unit_x()
            } else {
                Vector2d::unit_x()
            }
        });
        sum += dir * (radius - dist);
        count += 1;
    }
    (count > 0).then(|| sum / count as f64)
}

/// The most restrictive light state among the signals influencing the agent.
fn strictest_signal(
    agent: &Agent,
    waypoint: Option<Waypoint>,
    signals: &[Signal],
) -> Option<LightState> {
    let heading = direction(agent.velocity)
        .filter(|_| agent.velocity.magnitude() > MIN_HEADING_SPEED)
        .or_else(|| waypoint.and_then(|w| direction(w.position - agent.position)));
    signals
        .iter()
        .filter(|signal| signal.position.distance(agent.position) <= signal.influence_radius)
        .filter(|signal| {
            heading.map_or(true, |dir| (signal.position - agent.position).dot(dir) >= 0.0)
        })
        .map(|signal| signal.state)
        .max_by_key(|state| match state {
            LightState::Green => 0,
            LightState::Yellow => 1,
            LightState::Red => 2,
        })
}
