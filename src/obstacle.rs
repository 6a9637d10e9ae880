use crate::math::{offset_polygon, point_in_polygon, segment_enters_polygon, Point2d};
use itertools::Itertools;

/// A polygonal obstacle such as a building footprint.
#[derive(Clone, Debug)]
pub struct Obstacle {
    /// The vertices of the polygon, in order.
    polygon: Vec<Point2d>,
}

/// The static set of obstacles in the world.
#[derive(Clone, Debug, Default)]
pub struct ObstacleField {
    obstacles: Vec<Obstacle>,
}

/// Supplementary routing nodes and edges which lead around obstacles.
#[derive(Clone, Debug, Default)]
pub struct AvoidanceGraph {
    /// The node positions.
    pub nodes: Vec<Point2d>,
    /// Pairs of indices into `nodes` which can see each other.
    pub edges: Vec<(usize, usize)>,
}

impl Obstacle {
    /// The polygon's vertices.
    pub fn polygon(&self) -> &[Point2d] {
        &self.polygon
    }

    /// The polygon grown outwards by `radius`.
    pub fn buffered(&self, radius: f64) -> Vec<Point2d> {
        offset_polygon(&self.polygon, radius)
    }
}

impl ObstacleField {
    /// Creates an empty obstacle field.
    pub fn new() -> Self {
        Default::default()
    }

    /// Adds an obstacle. Polygons with fewer than three vertices are ignored.
    pub fn add_obstacle(&mut self, polygon: Vec<Point2d>) {
        if polygon.len() >= 3 {
            self.obstacles.push(Obstacle { polygon });
        }
    }

    /// Returns an iterator over the obstacles.
    pub fn iter(&self) -> impl Iterator<Item = &Obstacle> {
        self.obstacles.iter()
    }

    /// Whether the field holds no obstacles.
    pub fn is_empty(&self) -> bool {
        self.obstacles.is_empty()
    }

    /// Whether the segment `ab` passes through any obstacle grown by `buffer_radius`.
    pub fn blocks(&self, a: Point2d, b: Point2d, buffer_radius: f64) -> bool {
        self.obstacles
            .iter()
            .any(|obstacle| segment_enters_polygon(a, b, &obstacle.buffered(buffer_radius)))
    }

    /// Builds a visibility graph around the obstacles grown by `buffer_radius`.
    ///
    /// Each vertex of each grown polygon becomes a node, unless it lies inside another
    /// grown obstacle. Two nodes are joined if the segment between them does not pass
    /// through any grown obstacle.
    pub fn build_avoidance_graph(&self, buffer_radius: f64) -> AvoidanceGraph {
        let buffered = self
            .obstacles
            .iter()
            .map(|obstacle| obstacle.buffered(buffer_radius))
            .collect::<Vec<_>>();

        let nodes = buffered
            .iter()
            .enumerate()
            .flat_map(|(owner, polygon)| polygon.iter().map(move |p| (owner, *p)))
            .filter(|(owner, p)| {
                buffered
                    .iter()
                    .enumerate()
                    .all(|(idx, other)| idx == *owner || !point_in_polygon(*p, other))
            })
            .map(|(_, p)| p)
            .collect::<Vec<_>>();

        let edges = (0..nodes.len())
            .tuple_combinations()
            .filter(|(a, b)| {
                buffered
                    .iter()
                    .all(|polygon| !segment_enters_polygon(nodes[*a], nodes[*b], polygon))
            })
            .collect();

        AvoidanceGraph { nodes, edges }
    }
}
