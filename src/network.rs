use crate::math::Point2d;
use crate::obstacle::{AvoidanceGraph, ObstacleField};
use cgmath::prelude::*;
use itertools::iproduct;
use smallvec::SmallVec;

mod pathfinding;

/// Unique ID of a [RoadNode], which is also its insertion index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeId(usize);

/// An intersection or other point of the road network.
#[derive(Clone, Debug)]
pub struct RoadNode {
    /// The node ID.
    id: NodeId,
    /// The position in world space.
    position: Point2d,
    /// The edges that can be travelled from this node.
    edges: SmallVec<[usize; 4]>,
}

/// A road between two nodes.
#[derive(Clone, Debug)]
pub struct RoadEdge {
    /// The start and end nodes.
    nodes: [NodeId; 2],
    /// Whether the edge may also be travelled from end to start.
    bidirectional: bool,
    /// The length of the edge.
    length: f64,
    /// The speed limit and lane count.
    attributes: EdgeAttributes,
}

/// The attributes of a road edge.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EdgeAttributes {
    /// The speed limit in world units per second.
    pub speed_limit: f64,
    /// The number of lanes.
    pub lanes: u8,
}

/// A static road network.
#[derive(Clone, Debug)]
pub struct RoadNetwork {
    nodes: Vec<RoadNode>,
    edges: Vec<RoadEdge>,
    /// The attributes given to edges added with [RoadNetwork::connect].
    attributes: EdgeAttributes,
}

impl NodeId {
    /// The ID of the node with the given insertion index.
    pub fn from_index(index: usize) -> Self {
        Self(index)
    }

    /// The insertion index of the node.
    pub fn index(self) -> usize {
        self.0
    }
}

impl RoadNode {
    /// Gets the node ID.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// The node's position in world space.
    pub fn position(&self) -> Point2d {
        self.position
    }
}

impl RoadEdge {
    /// The node the edge starts at.
    pub fn from(&self) -> NodeId {
        self.nodes[0]
    }

    /// The node the edge ends at.
    pub fn to(&self) -> NodeId {
        self.nodes[1]
    }

    /// Whether the edge can be travelled in both directions.
    pub fn is_bidirectional(&self) -> bool {
        self.bidirectional
    }

    /// The Euclidean length of the edge.
    pub fn length(&self) -> f64 {
        self.length
    }

    /// The speed limit of the edge.
    pub fn speed_limit(&self) -> f64 {
        self.attributes.speed_limit
    }

    /// The number of lanes.
    pub fn lanes(&self) -> u8 {
        self.attributes.lanes
    }

    /// The node reached by travelling this edge from `node`, if the edge allows it.
    pub fn other(&self, node: NodeId) -> Option<NodeId> {
        match self.nodes {
            [from, to] if from == node => Some(to),
            [from, to] if to == node && self.bidirectional => Some(from),
            _ => None,
        }
    }
}

impl Default for EdgeAttributes {
    fn default() -> Self {
        Self {
            speed_limit: 20.0,
            lanes: 1,
        }
    }
}

impl RoadNetwork {
    /// Creates an empty network whose edges default to the given attributes.
    pub fn new(attributes: EdgeAttributes) -> Self {
        Self {
            nodes: vec![],
            edges: vec![],
            attributes,
        }
    }

    /// Creates a `size` by `size` grid of nodes `spacing` apart, joined to their
    /// horizontal and vertical neighbours by bidirectional edges.
    /// Nodes are inserted row by row, so the node in column `c` of row `r`
    /// has index `r * size + c` and position `(c * spacing, r * spacing)`.
    pub fn grid(size: usize, spacing: f64, attributes: EdgeAttributes) -> Self {
        let mut network = Self::new(attributes);
        for (row, col) in iproduct!(0..size, 0..size) {
            network.add_node(Point2d::new(col as f64 * spacing, row as f64 * spacing));
        }
        let id = |row: usize, col: usize| NodeId(row * size + col);
        for (row, col) in iproduct!(0..size, 0..size) {
            if col + 1 < size {
                network.connect(id(row, col), id(row, col + 1), true);
            }
            if row + 1 < size {
                network.connect(id(row, col), id(row + 1, col), true);
            }
        }
        network
    }

    /// Adds a node to the network.
    pub fn add_node(&mut self, position: Point2d) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(RoadNode {
            id,
            position,
            edges: SmallVec::new(),
        });
        id
    }

    /// Connects two nodes with an edge carrying the network's default attributes.
    pub fn connect(&mut self, a: NodeId, b: NodeId, bidirectional: bool) {
        self.connect_with(a, b, bidirectional, self.attributes);
    }

    /// Connects two nodes with an edge carrying the given attributes.
    /// Connecting a node to itself or to a node that does not exist does nothing.
    pub fn connect_with(
        &mut self,
        a: NodeId,
        b: NodeId,
        bidirectional: bool,
        attributes: EdgeAttributes,
    ) {
        let (Some(pa), Some(pb)) = (self.position(a), self.position(b)) else {
            return;
        };
        if a == b {
            return;
        }
        let length = pa.distance(pb);
        let idx = self.edges.len();
        self.edges.push(RoadEdge {
            nodes: [a, b],
            bidirectional,
            length,
            attributes,
        });
        self.nodes[a.index()].edges.push(idx);
        if bidirectional {
            self.nodes[b.index()].edges.push(idx);
        }
    }

    /// The number of nodes in the network.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Gets a node, if it exists.
    pub fn node(&self, id: NodeId) -> Option<&RoadNode> {
        self.nodes.get(id.index())
    }

    /// Returns an iterator over all the nodes, in insertion order.
    pub fn iter_nodes(&self) -> impl Iterator<Item = &RoadNode> {
        self.nodes.iter()
    }

    /// Returns an iterator over all the edges.
    pub fn iter_edges(&self) -> impl Iterator<Item = &RoadEdge> {
        self.edges.iter()
    }

    /// Gets the position of a node, if it exists.
    pub fn position(&self, id: NodeId) -> Option<Point2d> {
        self.node(id).map(|node| node.position)
    }

    /// The edges that can be travelled from the given node.
    pub fn edges_from(&self, id: NodeId) -> impl Iterator<Item = &RoadEdge> + '_ {
        self.nodes
            .get(id.index())
            .into_iter()
            .flat_map(|node| node.edges.iter().map(|idx| &self.edges[*idx]))
    }

    /// The number of edges that can be travelled from the given node.
    pub fn degree(&self, id: NodeId) -> usize {
        self.nodes.get(id.index()).map_or(0, |node| node.edges.len())
    }

    /// Finds the edge leading from `a` to `b`, if there is one.
    pub fn edge_between(&self, a: NodeId, b: NodeId) -> Option<&RoadEdge> {
        self.edges_from(a).find(|edge| edge.other(a) == Some(b))
    }

    /// Finds the node closest to the given point.
    pub fn nearest_node(&self, point: Point2d) -> Option<NodeId> {
        self.nodes
            .iter()
            .map(|node| (node.id, node.position.distance2(point)))
            .filter(|(_, dist)| dist.is_finite())
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(id, _)| id)
    }

    /// Adds the nodes and edges of an avoidance graph to the network.
    /// Every avoidance node is also linked to each road node within `link_distance`
    /// that it can reach without passing through an obstacle.
    pub fn attach_avoidance_graph(
        &mut self,
        graph: &AvoidanceGraph,
        field: &ObstacleField,
        buffer_radius: f64,
        link_distance: f64,
    ) {
        let road_nodes = self.nodes.len();
        let ids = graph
            .nodes
            .iter()
            .map(|pos| self.add_node(*pos))
            .collect::<Vec<_>>();
        for (a, b) in &graph.edges {
            self.connect(ids[*a], ids[*b], true);
        }
        for id in &ids {
            let pos = self.nodes[id.index()].position;
            let links = self.nodes[..road_nodes]
                .iter()
                .filter(|node| node.position.distance(pos) <= link_distance)
                .filter(|node| !field.blocks(pos, node.position, buffer_radius))
                .map(|node| node.id)
                .collect::<Vec<_>>();
            for node in links {
                self.connect(*id, node, true);
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn grid_layout() {
        let network = RoadNetwork::grid(3, 40.0, EdgeAttributes::default());
        assert_eq!(network.node_count(), 9);
        assert_eq!(network.iter_edges().count(), 12);
        assert_eq!(network.position(NodeId(5)), Some(Point2d::new(80.0, 40.0)));
        assert_eq!(network.degree(NodeId(0)), 2);
        assert_eq!(network.degree(NodeId(1)), 3);
        assert_eq!(network.degree(NodeId(4)), 4);
    }

    #[test]
    fn one_way_edges() {
        let mut network = RoadNetwork::new(EdgeAttributes::default());
        let a = network.add_node(Point2d::new(0.0, 0.0));
        let b = network.add_node(Point2d::new(3.0, 4.0));
        network.connect(a, b, false);
        network.connect(a, a, true);

        let edge = network.edge_between(a, b).unwrap();
        assert_eq!(edge.length(), 5.0);
        assert_eq!(edge.other(a), Some(b));
        assert_eq!(edge.other(b), None);
        assert!(network.edge_between(b, a).is_none());
        assert_eq!(network.degree(b), 0);
        assert_eq!(network.iter_edges().count(), 1);
    }

    #[test]
    fn large_indices_do_not_wrap() {
        let network = RoadNetwork::grid(2, 10.0, EdgeAttributes::default());
        let id = NodeId::from_index(usize::MAX);
        assert_eq!(id.index(), usize::MAX);
        assert!(network.node(id).is_none());
        assert_eq!(network.degree(id), 0);
    }

    #[test]
    fn nearest_node_ignores_nan() {
        let network = RoadNetwork::grid(2, 10.0, EdgeAttributes::default());
        assert_eq!(network.nearest_node(Point2d::new(9.0, 1.0)), Some(NodeId(1)));
        assert_eq!(network.nearest_node(Point2d::new(f64::NAN, 1.0)), None);
    }
}
