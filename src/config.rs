//! Simulation configuration.

use crate::math::Point2d;
use crate::util::Interval;
use crate::vehicle::VehicleKind;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The tunable parameters of a [Simulation](crate::Simulation).
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct SimulationConfig {
    /// The number of nodes along each side of a generated grid network.
    pub grid_size: usize,
    /// The distance between adjacent nodes of a generated grid network.
    pub node_spacing: f64,
    /// The maximum number of live vehicles.
    pub max_vehicles: usize,
    /// Seconds between automatic spawn attempts.
    pub spawn_interval: f64,
    /// Vehicles closer than this exert a separation force on each other.
    pub avoidance_radius: f64,
    /// A waypoint is reached once the vehicle is closer than this.
    pub arrival_threshold: f64,
    /// The duration of each traffic light state.
    pub light_durations: LightDurations,
    /// Traffic lights affect vehicles within this distance.
    pub light_influence_radius: f64,
    /// Vehicles leaving this region are removed.
    pub world_bounds: Bounds,
    /// The seed of the random number generator.
    pub seed: u64,
    /// The speed limit given to edges created with [RoadNetwork::connect](crate::RoadNetwork::connect).
    pub speed_limit: f64,
    /// The lane count given to edges created with [RoadNetwork::connect](crate::RoadNetwork::connect).
    pub lanes: u8,
    /// Number of nodes tried per automatic spawn before giving up for this interval.
    pub spawn_attempts: usize,
    /// Number of destinations tried when routing before giving up for this tick.
    pub route_attempts: usize,
    /// Radius by which obstacles are grown when building the avoidance graph.
    pub obstacle_buffer: f64,
    /// Avoidance nodes are linked to road nodes within this distance.
    pub obstacle_link_distance: f64,
    /// How red lights combine with the other steering goals.
    pub light_policy: LightPolicy,
    /// How neighbouring vehicles are found each tick.
    pub neighbor_search: NeighborSearch,
    /// Relative spawn frequency of each vehicle kind.
    pub vehicle_mix: Vec<(VehicleKind, f64)>,
}

/// The duration in seconds of each traffic light state.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct LightDurations {
    pub green: f64,
    pub yellow: f64,
    pub red: f64,
}

/// An axis aligned rectangle in world space.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Bounds {
    pub x: Interval<f64>,
    pub y: Interval<f64>,
}

/// The way red lights are composed with other steering goals.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum LightPolicy {
    /// Light goals are blended with the others like any other goal.
    /// A vehicle under strong seek or separation pressure may creep through a red light.
    #[default]
    Additive,
    /// An active red light goal replaces every other goal, so the vehicle always brakes.
    Override,
}

/// The neighbour search strategy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum NeighborSearch {
    /// Test every pair of vehicles.
    #[default]
    BruteForce,
    /// Bucket vehicles into a uniform grid with cells the size of the avoidance radius.
    Grid,
}

impl Default for LightDurations {
    fn default() -> Self {
        Self {
            green: 30.0,
            yellow: 3.0,
            // Long enough to cover the cross street's green and yellow
            red: 33.0,
        }
    }
}

impl Bounds {
    /// Creates bounds from two corners.
    pub fn new(min: Point2d, max: Point2d) -> Self {
        Self {
            x: Interval::new(min.x, max.x),
            y: Interval::new(min.y, max.y),
        }
    }

    /// Whether the point is inside the bounds. NaN coordinates are never inside.
    pub fn contains(&self, point: Point2d) -> bool {
        self.x.contains(point.x) && self.y.contains(point.y)
    }
}

impl SimulationConfig {
    /// The extent of the generated grid network, from the origin.
    pub fn grid_extent(&self) -> f64 {
        self.grid_size.saturating_sub(1) as f64 * self.node_spacing
    }

    /// Parses a configuration from JSON. Missing fields take their default values.
    #[cfg(feature = "serde")]
    pub fn from_json(json: &str) -> Result<Self, crate::ConfigError> {
        Ok(serde_json::from_str(json)?)
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        let grid_size = 5;
        let node_spacing = 40.0;
        let extent = (grid_size - 1) as f64 * node_spacing;
        let margin = 100.0;
        Self {
            grid_size,
            node_spacing,
            max_vehicles: 50,
            spawn_interval: 2.0,
            avoidance_radius: 20.0,
            arrival_threshold: 4.0,
            light_durations: LightDurations::default(),
            light_influence_radius: 15.0,
            world_bounds: Bounds {
                x: Interval::new(0.0, extent).expand(margin),
                y: Interval::new(0.0, extent).expand(margin),
            },
            seed: 0x5eed,
            speed_limit: 20.0,
            lanes: 1,
            spawn_attempts: 8,
            route_attempts: 8,
            obstacle_buffer: 2.0,
            obstacle_link_distance: 60.0,
            light_policy: LightPolicy::Additive,
            neighbor_search: NeighborSearch::BruteForce,
            vehicle_mix: vec![
                (VehicleKind::Car, 70.0),
                (VehicleKind::Bus, 10.0),
                (VehicleKind::Truck, 15.0),
                (VehicleKind::Emergency, 5.0),
            ],
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn default_bounds_cover_grid() {
        let config = SimulationConfig::default();
        let extent = config.grid_extent();
        assert_eq!(extent, 160.0);
        assert!(config.world_bounds.contains(Point2d::new(0.0, 0.0)));
        assert!(config.world_bounds.contains(Point2d::new(extent, extent)));
        assert!(!config.world_bounds.contains(Point2d::new(extent + 101.0, 0.0)));
        assert!(!config.world_bounds.contains(Point2d::new(f64::NAN, 0.0)));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn partial_json_keeps_defaults() {
        let config = SimulationConfig::from_json(
            r#"{ "max_vehicles": 7, "light_durations": { "red": 40.0 }, "light_policy": "Override" }"#,
        )
        .unwrap();
        assert_eq!(config.max_vehicles, 7);
        assert_eq!(config.light_durations.red, 40.0);
        assert_eq!(config.light_durations.green, 30.0);
        assert_eq!(config.light_policy, LightPolicy::Override);
        assert_eq!(config.spawn_interval, 2.0);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn malformed_json_is_an_error() {
        assert!(SimulationConfig::from_json("{ \"max_vehicles\": -1 }").is_err());
    }
}
