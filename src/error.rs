use crate::NodeId;
use std::fmt;

/// The reason a vehicle could not be spawned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpawnError {
    /// The population is already at its configured capacity.
    CapacityReached,
    /// The node does not exist in the road network.
    UnknownNode(NodeId),
    /// The spawn node lies outside the world bounds.
    OutOfBounds(NodeId),
    /// Another vehicle is already sitting on the spawn node.
    Occupied(NodeId),
    /// The destination cannot be reached from the spawn node.
    PathNotFound { from: NodeId, to: NodeId },
}

impl fmt::Display for SpawnError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpawnError::CapacityReached => write!(f, "vehicle capacity reached"),
            SpawnError::UnknownNode(node) => write!(f, "unknown node {}", node.index()),
            SpawnError::OutOfBounds(node) => {
                write!(f, "node {} is outside the world bounds", node.index())
            }
            SpawnError::Occupied(node) => write!(f, "node {} is occupied", node.index()),
            SpawnError::PathNotFound { from, to } => {
                write!(f, "no path from node {} to node {}", from.index(), to.index())
            }
        }
    }
}

impl std::error::Error for SpawnError {}

/// An error loading a [SimulationConfig](crate::SimulationConfig).
#[derive(Debug)]
pub enum ConfigError {
    /// The configuration could not be parsed.
    #[cfg(feature = "serde")]
    Json(serde_json::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            #[cfg(feature = "serde")]
            ConfigError::Json(ref err) => write!(f, "invalid configuration: {}", err),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match *self {
            #[cfg(feature = "serde")]
            ConfigError::Json(ref err) => Some(err),
        }
    }
}

#[cfg(feature = "serde")]
impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Json(err)
    }
}
