use crate::math::{clamp_magnitude, direction, is_finite_point, is_finite_vector, Point2d, Vector2d};
use crate::steering::Agent;
use crate::{Bounds, NodeId, RoadNetwork, VehicleId};
use cgmath::prelude::*;
pub use kind::{Color, KindAttributes, VehicleKind};

mod kind;

/// A simulated vehicle.
#[derive(Clone, Debug)]
pub struct Vehicle {
    /// The vehicle's ID
    pub(crate) id: VehicleId,
    /// The kind of vehicle.
    kind: VehicleKind,
    /// The position in world space.
    pos: Point2d,
    /// The velocity in world units per second.
    vel: Vector2d,
    /// The nodes the vehicle is driving through, in order.
    path: Vec<NodeId>,
    /// The index into `path` of the next waypoint.
    /// Equal to the path length once the destination has been reached.
    path_idx: usize,
}

impl Vehicle {
    /// Creates a new stationary vehicle.
    pub(crate) fn new(id: VehicleId, kind: VehicleKind, pos: Point2d, path: Vec<NodeId>) -> Self {
        Self {
            id,
            kind,
            pos,
            vel: Vector2d::zero(),
            path,
            path_idx: 0,
        }
    }

    /// Gets the vehicle's ID.
    pub fn id(&self) -> VehicleId {
        self.id
    }

    /// The kind of vehicle.
    pub fn kind(&self) -> VehicleKind {
        self.kind
    }

    /// The coordinates in world space of the centre of the vehicle.
    pub fn position(&self) -> Point2d {
        self.pos
    }

    /// The vehicle's velocity.
    pub fn velocity(&self) -> Vector2d {
        self.vel
    }

    /// The vehicle's speed.
    pub fn speed(&self) -> f64 {
        self.vel.magnitude()
    }

    /// The collision radius.
    pub fn radius(&self) -> f64 {
        self.kind.radius()
    }

    /// The display color.
    pub fn color(&self) -> Color {
        self.kind.color()
    }

    /// The vehicle's current path.
    pub fn path(&self) -> &[NodeId] {
        &self.path
    }

    /// The index of the next waypoint on the path.
    pub fn path_index(&self) -> usize {
        self.path_idx
    }

    /// The node the vehicle is heading for, if it has a path.
    pub fn destination(&self) -> Option<NodeId> {
        self.path.last().copied()
    }

    /// The next waypoint on the path.
    pub fn waypoint(&self) -> Option<NodeId> {
        self.path.get(self.path_idx).copied()
    }

    /// The waypoint most recently reached, if it is still part of the path.
    pub fn previous_waypoint(&self) -> Option<NodeId> {
        self.path_idx
            .checked_sub(1)
            .and_then(|idx| self.path.get(idx))
            .copied()
    }

    /// Whether the vehicle has no waypoints left to visit.
    pub fn route_complete(&self) -> bool {
        self.path_idx >= self.path.len()
    }

    /// Whether the vehicle's state has been corrupted by non-finite numbers.
    pub fn is_corrupt(&self) -> bool {
        !is_finite_point(self.pos) || !is_finite_vector(self.vel)
    }

    /// Whether the vehicle should be removed from the simulation.
    pub(crate) fn should_remove(&self, bounds: &Bounds) -> bool {
        self.is_corrupt() || !bounds.contains(self.pos)
    }

    /// Takes a read-only snapshot of the vehicle for steering.
    pub(crate) fn agent(&self) -> Agent {
        Agent {
            id: self.id,
            kind: self.kind,
            position: self.pos,
            velocity: self.vel,
        }
    }

    /// Integrates the vehicle's velocity and position.
    /// The velocity is clamped to the vehicle's top speed.
    ///
    /// # Parameters
    /// * `acc` - The acceleration to apply
    /// * `dt` - The time step in seconds
    pub(crate) fn integrate(&mut self, acc: Vector2d, dt: f64) {
        self.vel = clamp_magnitude(self.vel + acc * dt, self.kind.max_speed());
        self.pos += self.vel * dt;
    }

    /// Moves the vehicle, used to resolve contacts and for scripted placement.
    /// The velocity is clamped to the vehicle's top speed.
    pub(crate) fn set_state(&mut self, pos: Point2d, vel: Vector2d) {
        self.pos = pos;
        self.vel = clamp_magnitude(vel, self.kind.max_speed());
    }

    /// Replaces the vehicle's path and starts again from its first waypoint.
    pub(crate) fn set_route(&mut self, path: Vec<NodeId>) {
        self.path = path;
        self.path_idx = 0;
    }

    /// Checks whether the vehicle has reached its next waypoint,
    /// and if so, moves on to the following one.
    /// Returns `true` iff the waypoint was reached.
    ///
    /// A waypoint is reached when the vehicle comes within `threshold` of it,
    /// or once the vehicle has driven past it along the path.
    pub(crate) fn advance(&mut self, network: &RoadNetwork, threshold: f64) -> bool {
        let Some(target) = self.waypoint().and_then(|id| network.position(id)) else {
            return false;
        };
        let reached = self.pos.distance(target) < threshold || self.has_passed(target, network);
        if reached {
            self.path_idx += 1;
        }
        reached
    }

    /// Whether the vehicle is beyond the line through `target`
    /// perpendicular to the direction of travel along the path.
    fn has_passed(&self, target: Point2d, network: &RoadNetwork) -> bool {
        let pos = |idx: Option<usize>| {
            idx.and_then(|idx| self.path.get(idx))
                .and_then(|id| network.position(*id))
        };
        let heading = match pos(self.path_idx.checked_sub(1)) {
            Some(prev) => direction(target - prev),
            // At the start of a path the next leg gives the direction instead
            None => pos(Some(self.path_idx + 1)).and_then(|next| direction(next - target)),
        };
        heading.map_or(false, |dir| (self.pos - target).dot(dir) > 0.0)
    }
}
