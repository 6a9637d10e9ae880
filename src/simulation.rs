use crate::debug::{debug_contact, debug_steering};
#[cfg(feature = "debug")]
use crate::debug::take_debug_frame;
use crate::light::TrafficLight;
use crate::math::{direction, Point2d, Vector2d};
use crate::spatial::SpatialGrid;
use crate::steering::{self, Agent, Road, Signal, SteeringParams, Waypoint};
use crate::{
    Color, EdgeAttributes, NeighborSearch, NodeId, ObstacleField, RoadNetwork, SimulationConfig,
    SpawnError, TrafficLightId, Vehicle, VehicleId, VehicleKind, VehicleSet,
};
use cgmath::prelude::*;
use itertools::Itertools;
use log::{debug, info, trace, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, WeightedIndex};
use slotmap::SlotMap;

/// An agent-based traffic simulation.
pub struct Simulation {
    /// The simulation parameters.
    config: SimulationConfig,
    /// The road network, including any obstacle avoidance nodes.
    network: RoadNetwork,
    /// The static obstacles.
    obstacles: ObstacleField,
    /// The traffic lights.
    lights: SlotMap<TrafficLightId, TrafficLight>,
    /// The vehicles being simulated.
    vehicles: VehicleSet,
    /// Snapshot of the vehicles taken at the start of the current tick.
    agents: Vec<Agent>,
    /// Snapshot of the traffic lights taken at the start of the current tick.
    signals: Vec<Signal>,
    /// Neighbour lookup over `agents`.
    grid: SpatialGrid,
    /// The source of all randomness.
    rng: StdRng,
    /// The vehicle kinds to spawn and their weighted distribution.
    kind_mix: Option<(Vec<VehicleKind>, WeightedIndex<f64>)>,
    /// Seconds since the last automatic spawn.
    spawn_timer: f64,
    /// Whether [Simulation::update] advances the simulation.
    running: bool,
    /// The number of ticks simulated.
    frame: usize,
    /// Debugging information from the previously simulated frame.
    #[cfg(feature = "debug")]
    debug: serde_json::Value,
}

/// What a renderer needs to draw a vehicle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VehicleView {
    pub position: Point2d,
    pub color: Color,
    pub kind: VehicleKind,
}

impl Simulation {
    /// Creates a paused simulation of the given network.
    ///
    /// If there are any obstacles, an avoidance graph is built around them
    /// and attached to the network. The graph is not rebuilt afterwards.
    pub fn new(config: SimulationConfig, mut network: RoadNetwork, obstacles: ObstacleField) -> Self {
        if !obstacles.is_empty() {
            let graph = obstacles.build_avoidance_graph(config.obstacle_buffer);
            network.attach_avoidance_graph(
                &graph,
                &obstacles,
                config.obstacle_buffer,
                config.obstacle_link_distance,
            );
            debug!(
                "attached avoidance graph with {} nodes and {} edges",
                graph.nodes.len(),
                graph.edges.len()
            );
        }

        let (kinds, weights): (Vec<_>, Vec<_>) = config.vehicle_mix.iter().copied().unzip();
        let kind_mix = match WeightedIndex::new(&weights) {
            Ok(distr) => Some((kinds, distr)),
            Err(err) => {
                warn!("invalid vehicle mix ({}), spawning cars only", err);
                None
            }
        };

        Self {
            rng: StdRng::seed_from_u64(config.seed),
            vehicles: VehicleSet::with_capacity_and_key(config.max_vehicles),
            agents: Vec::with_capacity(config.max_vehicles),
            signals: vec![],
            grid: SpatialGrid::default(),
            lights: SlotMap::with_key(),
            kind_mix,
            spawn_timer: 0.0,
            running: false,
            frame: 0,
            #[cfg(feature = "debug")]
            debug: serde_json::Value::Null,
            config,
            network,
            obstacles,
        }
    }

    /// Creates a paused simulation of a square grid network, as described by
    /// [SimulationConfig::grid_size] and [SimulationConfig::node_spacing],
    /// with a traffic light at every four-way intersection.
    pub fn with_grid(config: SimulationConfig) -> Self {
        let attributes = EdgeAttributes {
            speed_limit: config.speed_limit,
            lanes: config.lanes,
        };
        let network = RoadNetwork::grid(config.grid_size, config.node_spacing, attributes);
        let mut sim = Self::new(config, network, ObstacleField::new());
        let junctions = sim
            .network
            .iter_nodes()
            .filter(|node| sim.network.degree(node.id()) >= 4)
            .map(|node| node.id())
            .collect::<Vec<_>>();
        for node in junctions {
            sim.add_traffic_light(node);
        }
        sim
    }

    /// Adds a traffic light at the given node, starting on green.
    /// Returns `None` if the node does not exist.
    pub fn add_traffic_light(&mut self, node: NodeId) -> Option<TrafficLightId> {
        let position = self.network.position(node)?;
        let light = TrafficLight::new(
            node,
            position,
            self.config.light_durations,
            self.config.light_influence_radius,
        );
        Some(self.lights.insert(light))
    }

    /// Resumes the simulation.
    pub fn start(&mut self) {
        if !self.running {
            info!("simulation started at frame {}", self.frame);
        }
        self.running = true;
    }

    /// Pauses the simulation. Ticks are ignored until it is started again.
    pub fn stop(&mut self) {
        if self.running {
            info!("simulation stopped at frame {}", self.frame);
        }
        self.running = false;
    }

    /// Whether the simulation is running.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Adds a stationary vehicle at the `start` node, routed to `dst`.
    pub fn spawn_vehicle(
        &mut self,
        kind: VehicleKind,
        start: NodeId,
        dst: NodeId,
    ) -> Result<VehicleId, SpawnError> {
        if self.vehicles.len() >= self.config.max_vehicles {
            return Err(SpawnError::CapacityReached);
        }
        self.check_spawn_node(kind, start)?;
        if self.network.node(dst).is_none() {
            return Err(SpawnError::UnknownNode(dst));
        }
        let path = self.network.find_path(start, dst);
        if path.is_empty() {
            return Err(SpawnError::PathNotFound { from: start, to: dst });
        }
        Ok(self.insert_vehicle(kind, start, path))
    }

    /// Moves a vehicle and sets its velocity, which is clamped to its top speed.
    /// Returns `false` if there is no such vehicle.
    pub fn set_vehicle_state(&mut self, id: VehicleId, pos: Point2d, vel: Vector2d) -> bool {
        match self.vehicles.get_mut(id) {
            Some(vehicle) => {
                vehicle.set_state(pos, vel);
                true
            }
            None => false,
        }
    }

    /// Advances the simulation by `dt` seconds.
    ///
    /// Does nothing while the simulation is paused, or if `dt` is not a positive finite number.
    pub fn update(&mut self, dt: f64) {
        if !self.running || !(dt > 0.0 && dt.is_finite()) {
            return;
        }
        self.update_lights(dt);
        self.take_snapshot();
        self.apply_steering(dt);
        self.resolve_contacts();
        self.advance_vehicles();
        self.spawn_vehicles(dt);
        self.remove_vehicles();
        self.frame += 1;

        #[cfg(feature = "debug")]
        {
            self.debug = take_debug_frame();
        }
    }

    /// Gets the number of ticks simulated so far.
    pub fn frame(&self) -> usize {
        self.frame
    }

    /// The simulation parameters.
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// The road network.
    pub fn network(&self) -> &RoadNetwork {
        &self.network
    }

    /// The obstacles.
    pub fn obstacles(&self) -> &ObstacleField {
        &self.obstacles
    }

    /// Returns an iterator over the vehicles, for rendering.
    pub fn vehicles(&self) -> impl Iterator<Item = VehicleView> + '_ {
        self.vehicles.values().map(|vehicle| VehicleView {
            position: vehicle.position(),
            color: vehicle.color(),
            kind: vehicle.kind(),
        })
    }

    /// Returns an iterator over all the vehicles in the simulation.
    pub fn iter_vehicles(&self) -> impl Iterator<Item = &Vehicle> {
        self.vehicles.values()
    }

    /// The number of live vehicles.
    pub fn vehicle_count(&self) -> usize {
        self.vehicles.len()
    }

    /// Gets a reference to the vehicle with the given ID.
    pub fn get_vehicle(&self, id: VehicleId) -> Option<&Vehicle> {
        self.vehicles.get(id)
    }

    /// Returns an iterator over all the traffic lights in the simulation.
    pub fn iter_lights(&self) -> impl Iterator<Item = (TrafficLightId, &TrafficLight)> {
        self.lights.iter()
    }

    /// Gets the debugging information for the previously simulated frame as JSON array.
    #[cfg(feature = "debug")]
    pub fn debug(&self) -> serde_json::Value {
        self.debug.clone()
    }

    /// Checks that a vehicle of the given kind could be placed on the node,
    /// and returns the node's position.
    fn check_spawn_node(&self, kind: VehicleKind, node: NodeId) -> Result<Point2d, SpawnError> {
        let pos = self
            .network
            .position(node)
            .ok_or(SpawnError::UnknownNode(node))?;
        if !self.config.world_bounds.contains(pos) {
            return Err(SpawnError::OutOfBounds(node));
        }
        let occupied = self
            .vehicles
            .values()
            .any(|other| other.position().distance(pos) < kind.radius() + other.radius());
        if occupied {
            return Err(SpawnError::Occupied(node));
        }
        Ok(pos)
    }

    fn insert_vehicle(&mut self, kind: VehicleKind, start: NodeId, path: Vec<NodeId>) -> VehicleId {
        let pos = self.network.position(start).unwrap_or_else(Point2d::origin);
        let id = self
            .vehicles
            .insert_with_key(|id| Vehicle::new(id, kind, pos, path));
        debug!("spawned {:?} {:?} at node {}", kind, id, start.index());
        id
    }

    /// Updates the traffic lights.
    fn update_lights(&mut self, dt: f64) {
        for light in self.lights.values_mut() {
            light.step(dt);
        }
    }

    /// Records the state of every vehicle and light before anything moves.
    fn take_snapshot(&mut self) {
        self.agents.clear();
        self.agents.extend(
            self.vehicles
                .values()
                .filter(|vehicle| !vehicle.is_corrupt())
                .map(Vehicle::agent),
        );
        self.signals.clear();
        self.signals.extend(self.lights.values().map(|light| Signal {
            position: light.position(),
            state: light.state(),
            influence_radius: light.influence_radius(),
        }));
        if self.config.neighbor_search == NeighborSearch::Grid {
            self.grid.rebuild(self.config.avoidance_radius, &self.agents);
        }
    }

    /// Steers every vehicle against the snapshot, then moves them all.
    fn apply_steering(&mut self, dt: f64) {
        let params = SteeringParams {
            avoidance_radius: self.config.avoidance_radius,
            light_policy: self.config.light_policy,
        };

        let mut accelerations = Vec::with_capacity(self.agents.len());
        let mut nearby = vec![];
        let mut scratch = vec![];
        for agent in &self.agents {
            let waypoint = self
                .vehicles
                .get(agent.id)
                .and_then(|vehicle| waypoint_of(&self.network, vehicle));
            let neighbors = match self.config.neighbor_search {
                NeighborSearch::BruteForce => &self.agents[..],
                NeighborSearch::Grid => {
                    self.grid
                        .query(agent.position, params.avoidance_radius, &mut nearby);
                    scratch.clear();
                    scratch.extend(nearby.iter().map(|idx| self.agents[*idx]));
                    &scratch[..]
                }
            };
            let acc = steering::compose(agent, waypoint, neighbors, &self.signals, &params);
            accelerations.push((agent.id, acc));
        }

        for (id, acc) in accelerations {
            if let Some(vehicle) = self.vehicles.get_mut(id) {
                debug_steering(id, vehicle.position(), acc);
                vehicle.integrate(acc, dt);
            }
        }
    }

    /// Pushes overlapping vehicles apart and removes the part of their velocities
    /// that carries them into each other. Every correction is computed from the
    /// post-integration state before any is applied.
    fn resolve_contacts(&mut self) {
        let bodies = self
            .vehicles
            .values()
            .filter(|vehicle| !vehicle.is_corrupt())
            .map(|vehicle| (vehicle.id(), vehicle.position(), vehicle.velocity(), vehicle.radius()))
            .collect::<Vec<_>>();

        let mut corrections = vec![(Vector2d::zero(), Vector2d::zero()); bodies.len()];
        for ((i, a), (j, b)) in bodies.iter().enumerate().tuple_combinations() {
            let (id_a, pos_a, vel_a, rad_a) = *a;
            let (id_b, pos_b, vel_b, rad_b) = *b;
            let offset = pos_b - pos_a;
            let overlap = rad_a + rad_b - offset.magnitude();
            if !(overlap > 0.0) {
                continue;
            }
            let normal = direction(offset).unwrap_or_else(Vector2d::unit_x);
            corrections[i].0 -= normal * (0.5 * overlap);
            corrections[j].0 += normal * (0.5 * overlap);
            corrections[i].1 -= normal * f64::max(vel_a.dot(normal), 0.0);
            corrections[j].1 -= normal * f64::min(vel_b.dot(normal), 0.0);
            debug_contact(id_a, id_b, pos_a + offset * 0.5, overlap);
        }

        for ((id, pos, vel, _), (dpos, dvel)) in bodies.into_iter().zip(corrections) {
            if dpos != Vector2d::zero() || dvel != Vector2d::zero() {
                self.vehicles[id].set_state(pos + dpos, vel + dvel);
            }
        }
    }

    /// Moves vehicles on to their next waypoints, and gives vehicles
    /// which have finished their route a new one.
    fn advance_vehicles(&mut self) {
        let threshold = self.config.arrival_threshold;
        let attempts = self.config.route_attempts;
        for vehicle in self.vehicles.values_mut() {
            if vehicle.is_corrupt() {
                continue;
            }
            vehicle.advance(&self.network, threshold);
            if !vehicle.route_complete() {
                continue;
            }
            let origin = vehicle
                .destination()
                .or_else(|| self.network.nearest_node(vehicle.position()));
            let route = origin.and_then(|origin| {
                self.network
                    .random_route(origin, &mut self.rng, attempts)
            });
            match route {
                Some(path) => vehicle.set_route(path),
                None => trace!("no route for {:?}, holding", vehicle.id()),
            }
        }
    }

    /// Spawns a vehicle at a random free node once every spawn interval.
    fn spawn_vehicles(&mut self, dt: f64) {
        self.spawn_timer += dt;
        if self.spawn_timer < self.config.spawn_interval {
            return;
        }
        self.spawn_timer = 0.0;

        if self.vehicles.len() >= self.config.max_vehicles {
            debug!("spawn skipped: {}", SpawnError::CapacityReached);
            return;
        }
        let node_count = self.network.node_count();
        if node_count == 0 {
            return;
        }

        let kind = self.random_kind();
        for _ in 0..self.config.spawn_attempts {
            let start = NodeId::from_index(self.rng.gen_range(0..node_count));
            if let Err(err) = self.check_spawn_node(kind, start) {
                debug!("spawn attempt failed: {}", err);
                continue;
            }
            let route = self
                .network
                .random_route(start, &mut self.rng, self.config.route_attempts);
            match route {
                Some(path) => {
                    self.insert_vehicle(kind, start, path);
                    return;
                }
                None => debug!("spawn attempt failed: no route from node {}", start.index()),
            }
        }
        debug!("spawn skipped: no free node found");
    }

    /// Picks a vehicle kind according to the configured mix.
    fn random_kind(&mut self) -> VehicleKind {
        match &self.kind_mix {
            Some((kinds, distr)) => kinds[distr.sample(&mut self.rng)],
            None => VehicleKind::Car,
        }
    }

    /// Removes vehicles which have left the world or whose state is corrupt.
    fn remove_vehicles(&mut self) {
        let bounds = self.config.world_bounds;
        self.vehicles.retain(|id, vehicle| {
            let remove = vehicle.should_remove(&bounds);
            if remove {
                debug!("removed {:?} at {:?}", id, vehicle.position());
            }
            !remove
        });
    }
}

/// The steering target of a vehicle, along with the road it is on.
fn waypoint_of(network: &RoadNetwork, vehicle: &Vehicle) -> Option<Waypoint> {
    let target = vehicle.waypoint()?;
    let position = network.position(target)?;
    let road = vehicle.previous_waypoint().and_then(|prev| {
        let edge = network.edge_between(prev, target)?;
        let from = network.position(prev)?;
        Some(Road {
            direction: direction(position - from)?,
            speed_limit: edge.speed_limit(),
        })
    });
    Some(Waypoint {
        position,
        road,
        is_destination: vehicle.path_index() + 1 == vehicle.path().len(),
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{LightState, ObstacleField};
    use assert_approx_eq::assert_approx_eq;

    fn config() -> SimulationConfig {
        SimulationConfig {
            grid_size: 3,
            spawn_interval: f64::INFINITY,
            ..Default::default()
        }
    }

    fn node(idx: usize) -> NodeId {
        NodeId::from_index(idx)
    }

    #[test]
    fn grid_has_lights_at_four_way_junctions() {
        let sim = Simulation::with_grid(config());
        let lights = sim.iter_lights().map(|(_, l)| l.node()).collect::<Vec<_>>();
        assert_eq!(lights, vec![node(4)]);
        assert_eq!(sim.network().node_count(), 9);
        assert!(!sim.is_running());
    }

    #[test]
    fn spawn_errors() {
        let mut sim = Simulation::with_grid(SimulationConfig {
            max_vehicles: 2,
            ..config()
        });
        let id = sim.spawn_vehicle(VehicleKind::Car, node(0), node(8)).unwrap();
        assert_eq!(sim.get_vehicle(id).unwrap().path().first(), Some(&node(0)));
        assert_eq!(
            sim.spawn_vehicle(VehicleKind::Bus, node(0), node(8)),
            Err(SpawnError::Occupied(node(0)))
        );
        assert_eq!(
            sim.spawn_vehicle(VehicleKind::Car, node(99), node(8)),
            Err(SpawnError::UnknownNode(node(99)))
        );
        assert_eq!(
            sim.spawn_vehicle(VehicleKind::Car, node(1), node(99)),
            Err(SpawnError::UnknownNode(node(99)))
        );
        sim.spawn_vehicle(VehicleKind::Car, node(2), node(6)).unwrap();
        assert_eq!(
            sim.spawn_vehicle(VehicleKind::Car, node(3), node(6)),
            Err(SpawnError::CapacityReached)
        );
    }

    #[test]
    fn spawn_requires_route_and_bounds() {
        let mut network = RoadNetwork::new(EdgeAttributes::default());
        let a = network.add_node(Point2d::new(0.0, 0.0));
        let b = network.add_node(Point2d::new(50.0, 0.0));
        let far = network.add_node(Point2d::new(5000.0, 0.0));
        network.connect(a, b, false);
        let mut sim = Simulation::new(config(), network, ObstacleField::new());
        assert_eq!(
            sim.spawn_vehicle(VehicleKind::Car, b, a),
            Err(SpawnError::PathNotFound { from: b, to: a })
        );
        assert_eq!(
            sim.spawn_vehicle(VehicleKind::Car, far, a),
            Err(SpawnError::OutOfBounds(far))
        );
        assert!(sim.spawn_vehicle(VehicleKind::Car, a, b).is_ok());
    }

    #[test]
    fn paused_simulation_does_nothing() {
        let mut sim = Simulation::with_grid(config());
        let id = sim.spawn_vehicle(VehicleKind::Car, node(0), node(8)).unwrap();
        sim.set_vehicle_state(id, Point2d::new(1.0, 0.0), Vector2d::new(10.0, 0.0));
        for _ in 0..10 {
            sim.update(0.1);
        }
        assert_eq!(sim.frame(), 0);
        assert_eq!(sim.get_vehicle(id).unwrap().position(), Point2d::new(1.0, 0.0));
        assert!(sim.iter_lights().all(|(_, l)| l.elapsed() == 0.0));

        sim.start();
        sim.update(0.1);
        assert_eq!(sim.frame(), 1);
        assert_approx_eq!(sim.get_vehicle(id).unwrap().position().x, 2.0, 0.5);
    }

    #[test]
    fn invalid_steps_are_ignored() {
        let mut sim = Simulation::with_grid(config());
        sim.start();
        for dt in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            sim.update(dt);
        }
        assert_eq!(sim.frame(), 0);
        assert!(sim.iter_lights().all(|(_, l)| l.elapsed() == 0.0));
    }

    #[test]
    fn set_state_clamps_and_reports_missing() {
        let mut sim = Simulation::with_grid(config());
        let id = sim.spawn_vehicle(VehicleKind::Bus, node(0), node(8)).unwrap();
        assert!(sim.set_vehicle_state(id, Point2d::new(3.0, 3.0), Vector2d::new(100.0, 0.0)));
        assert_approx_eq!(sim.get_vehicle(id).unwrap().speed(), VehicleKind::Bus.max_speed());
        assert!(!sim.set_vehicle_state(VehicleId::default(), Point2d::origin(), Vector2d::zero()));
    }

    #[test]
    fn corrupt_vehicles_are_removed() {
        let mut sim = Simulation::with_grid(config());
        let id = sim.spawn_vehicle(VehicleKind::Car, node(0), node(8)).unwrap();
        let other = sim.spawn_vehicle(VehicleKind::Car, node(8), node(0)).unwrap();
        sim.set_vehicle_state(id, Point2d::new(f64::NAN, 0.0), Vector2d::zero());
        sim.start();
        sim.update(0.1);
        assert!(sim.get_vehicle(id).is_none());
        assert!(sim.get_vehicle(other).is_some());
        assert_eq!(sim.vehicle_count(), 1);
    }

    #[test]
    fn overlapping_vehicles_are_pushed_apart() {
        let mut sim = Simulation::with_grid(config());
        let a = sim.spawn_vehicle(VehicleKind::Car, node(0), node(2)).unwrap();
        let b = sim.spawn_vehicle(VehicleKind::Car, node(2), node(0)).unwrap();
        sim.set_vehicle_state(a, Point2d::new(40.0, 0.0), Vector2d::new(15.0, 0.0));
        sim.set_vehicle_state(b, Point2d::new(41.0, 0.0), Vector2d::new(-15.0, 0.0));
        sim.start();
        sim.update(0.01);
        let pa = sim.get_vehicle(a).unwrap().position();
        let pb = sim.get_vehicle(b).unwrap().position();
        assert!(pa.distance(pb) >= 4.0 - 1e-9);
        assert!(sim.get_vehicle(a).unwrap().velocity().x <= 1e-9);
        assert!(sim.get_vehicle(b).unwrap().velocity().x >= -1e-9);
    }

    #[test]
    fn spawner_respects_capacity() {
        let mut sim = Simulation::with_grid(SimulationConfig {
            spawn_interval: 0.5,
            max_vehicles: 3,
            ..config()
        });
        sim.start();
        for _ in 0..100 {
            sim.update(0.1);
            assert!(sim.vehicle_count() <= 3);
        }
        assert_eq!(sim.vehicle_count(), 3);
    }

    #[test]
    fn invalid_vehicle_mix_spawns_cars() {
        let mut sim = Simulation::with_grid(SimulationConfig {
            spawn_interval: 0.0,
            vehicle_mix: vec![(VehicleKind::Bus, 0.0)],
            max_vehicles: 4,
            ..config()
        });
        sim.start();
        for _ in 0..10 {
            sim.update(0.1);
        }
        assert!(sim.vehicle_count() > 0);
        assert!(sim.vehicles().all(|v| v.kind == VehicleKind::Car));
    }

    #[test]
    fn arrival_assigns_a_fresh_route() {
        let mut sim = Simulation::with_grid(config());
        let id = sim.spawn_vehicle(VehicleKind::Car, node(0), node(1)).unwrap();
        let old = sim.get_vehicle(id).unwrap().path().to_vec();
        sim.start();
        let mut rerouted = false;
        for _ in 0..600 {
            sim.update(1.0 / 60.0);
            let vehicle = sim.get_vehicle(id).unwrap();
            if vehicle.path() != old {
                assert_eq!(vehicle.path().first(), Some(&node(1)));
                assert!(vehicle.path().len() >= 2);
                assert!(vehicle.path_index() <= 1);
                assert!(!vehicle.route_complete());
                rerouted = true;
                break;
            }
        }
        assert!(rerouted);
        assert_eq!(sim.vehicle_count(), 1);
    }

    #[test]
    fn vehicle_without_route_holds() {
        let mut network = RoadNetwork::new(EdgeAttributes::default());
        let a = network.add_node(Point2d::new(0.0, 0.0));
        let b = network.add_node(Point2d::new(50.0, 0.0));
        network.connect(a, b, false);
        let mut sim = Simulation::new(config(), network, ObstacleField::new());
        let id = sim.spawn_vehicle(VehicleKind::Car, a, b).unwrap();
        sim.start();
        for _ in 0..1200 {
            sim.update(1.0 / 60.0);
        }
        let vehicle = sim.get_vehicle(id).unwrap();
        assert!(vehicle.route_complete());
        assert_eq!(vehicle.path(), &[a, b]);
        assert!(vehicle.speed() < 0.05);
        assert!(vehicle.position().distance(Point2d::new(50.0, 0.0)) < 10.0);

        // Still retried every tick, and still stuck
        sim.update(1.0 / 60.0);
        assert!(sim.get_vehicle(id).unwrap().route_complete());
        assert_eq!(sim.vehicle_count(), 1);
    }

    #[test]
    fn spawner_retries_occupied_nodes() {
        let mut network = RoadNetwork::new(EdgeAttributes::default());
        let a = network.add_node(Point2d::new(0.0, 0.0));
        let b = network.add_node(Point2d::new(50.0, 0.0));
        network.connect(a, b, true);
        let mut sim = Simulation::new(
            SimulationConfig {
                spawn_interval: 0.0,
                spawn_attempts: 32,
                max_vehicles: 2,
                ..config()
            },
            network,
            ObstacleField::new(),
        );
        let parked = sim.spawn_vehicle(VehicleKind::Truck, a, b).unwrap();
        sim.start();
        sim.update(1.0 / 60.0);
        assert_eq!(sim.vehicle_count(), 2);
        let spawned = sim.iter_vehicles().find(|v| v.id() != parked).unwrap();
        assert_eq!(spawned.path().first(), Some(&b));
    }

    #[test]
    fn spawner_retries_nodes_without_routes() {
        let mut network = RoadNetwork::new(EdgeAttributes::default());
        let hub = network.add_node(Point2d::new(0.0, 0.0));
        for i in 0..3 {
            let sink = network.add_node(Point2d::new(40.0, 40.0 * i as f64));
            network.connect(hub, sink, false);
        }
        let mut sim = Simulation::new(
            SimulationConfig {
                spawn_interval: 0.0,
                spawn_attempts: 32,
                max_vehicles: 1,
                ..config()
            },
            network,
            ObstacleField::new(),
        );
        sim.start();
        sim.update(1.0 / 60.0);
        sim.update(1.0 / 60.0);
        assert_eq!(sim.vehicle_count(), 1);
        let vehicle = sim.iter_vehicles().next().unwrap();
        assert_eq!(vehicle.path().first(), Some(&hub));
    }

    #[cfg(feature = "debug")]
    #[test]
    fn debug_frame_names_vehicles() {
        use slotmap::Key;
        let mut sim = Simulation::with_grid(config());
        let id = sim.spawn_vehicle(VehicleKind::Car, node(0), node(8)).unwrap();
        sim.start();
        sim.update(0.1);
        let sim = &sim;
        let frame = sim.debug();
        let records = frame.as_array().unwrap();
        assert!(records.iter().any(|record| {
            record["type"] == "steering" && record["vehicle"] == id.data().as_ffi()
        }));
    }

    #[test]
    fn lights_step_with_the_simulation() {
        let mut sim = Simulation::with_grid(config());
        sim.start();
        for _ in 0..61 {
            sim.update(0.5);
        }
        assert!(sim.iter_lights().all(|(_, l)| l.state() == LightState::Yellow));
    }

    #[test]
    fn obstacles_extend_the_network() {
        let mut obstacles = ObstacleField::new();
        obstacles.add_obstacle(vec![
            Point2d::new(10.0, 10.0),
            Point2d::new(30.0, 10.0),
            Point2d::new(30.0, 30.0),
            Point2d::new(10.0, 30.0),
        ]);
        let network = RoadNetwork::grid(2, 40.0, EdgeAttributes::default());
        let sim = Simulation::new(config(), network, obstacles);
        assert_eq!(sim.network().node_count(), 8);
        assert_eq!(sim.obstacles().iter().count(), 1);
    }
}
