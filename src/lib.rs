pub use cgmath;
pub use config::{Bounds, LightDurations, LightPolicy, NeighborSearch, SimulationConfig};
pub use error::{ConfigError, SpawnError};
pub use light::{LightState, TrafficLight};
pub use network::{EdgeAttributes, NodeId, RoadEdge, RoadNetwork, RoadNode};
pub use obstacle::{AvoidanceGraph, Obstacle, ObstacleField};
pub use simulation::{Simulation, VehicleView};
use slotmap::{new_key_type, SlotMap};
pub use slotmap::{Key, KeyData};
pub use util::Interval;
pub use vehicle::{Color, Vehicle, VehicleKind};

mod config;
mod debug;
mod error;
mod light;
pub mod math;
mod network;
mod obstacle;
mod simulation;
mod spatial;
pub mod steering;
mod util;
mod vehicle;

new_key_type! {
    /// Unique ID of a [Vehicle].
    pub struct VehicleId;
    /// Unique ID of a [TrafficLight].
    pub struct TrafficLightId;
}

type VehicleSet = SlotMap<VehicleId, Vehicle>;
