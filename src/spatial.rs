//! Uniform grid bucketing for neighbour queries.

use crate::math::{is_finite_point, Point2d};
use crate::steering::Agent;
use smallvec::SmallVec;
use std::collections::HashMap;

/// Buckets agents by position so that neighbour queries only visit nearby cells.
#[derive(Clone, Debug, Default)]
pub(crate) struct SpatialGrid {
    /// The width and height of a cell.
    cell: f64,
    /// Indices into the agent snapshot, per cell.
    buckets: HashMap<(i64, i64), SmallVec<[usize; 8]>>,
}

impl SpatialGrid {
    /// Clears the grid and inserts every agent of the snapshot.
    /// Agents with non-finite positions are left out.
    pub fn rebuild(&mut self, cell: f64, agents: &[Agent]) {
        self.cell = cell;
        self.buckets.clear();
        for (idx, agent) in agents.iter().enumerate() {
            if is_finite_point(agent.position) {
                let key = self.cell_of(agent.position);
                self.buckets.entry(key).or_default().push(idx);
            }
        }
    }

    /// Collects the snapshot indices of all agents in cells overlapping the disc
    /// of `radius` around `point`, in ascending order. The result is a superset
    /// of the agents actually within `radius`.
    pub fn query(&self, point: Point2d, radius: f64, out: &mut Vec<usize>) {
        out.clear();
        if !is_finite_point(point) || !(self.cell > 0.0) {
            return;
        }
        let (x0, y0) = self.cell_of(Point2d::new(point.x - radius, point.y - radius));
        let (x1, y1) = self.cell_of(Point2d::new(point.x + radius, point.y + radius));
        for x in x0..=x1 {
            for y in y0..=y1 {
                if let Some(bucket) = self.buckets.get(&(x, y)) {
                    out.extend_from_slice(bucket);
                }
            }
        }
        // Snapshot order keeps the results identical to a brute force scan
        out.sort_unstable();
    }

    fn cell_of(&self, point: Point2d) -> (i64, i64) {
        (
            (point.x / self.cell).floor() as i64,
            (point.y / self.cell).floor() as i64,
        )
    }
}
