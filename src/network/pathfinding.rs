use super::{NodeId, RoadNetwork};
use rand::seq::SliceRandom;
use rand::Rng;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// An entry in the Dijkstra frontier.
/// Ordered so that the max-heap pops the cheapest entry,
/// and among equally cheap entries the lowest node index.
#[derive(Clone, Copy, Debug)]
struct Frontier {
    cost: f64,
    node: NodeId,
}

impl PartialEq for Frontier {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Frontier {}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Frontier {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl RoadNetwork {
    /// Finds the shortest path between two nodes by cumulative edge length.
    ///
    /// When several paths are equally short, each node on the path is reached
    /// from the lowest-indexed predecessor available, so results are reproducible.
    /// Returns an empty path if `to` cannot be reached from `from`.
    pub fn find_path(&self, from: NodeId, to: NodeId) -> Vec<NodeId> {
        let n = self.nodes.len();
        if from.index() >= n || to.index() >= n {
            return vec![];
        }

        let mut dist = vec![f64::INFINITY; n];
        let mut prev: Vec<Option<NodeId>> = vec![None; n];
        let mut done = vec![false; n];
        let mut heap = BinaryHeap::new();

        dist[from.index()] = 0.0;
        heap.push(Frontier {
            cost: 0.0,
            node: from,
        });

        while let Some(Frontier { cost, node }) = heap.pop() {
            if done[node.index()] {
                continue;
            }
            done[node.index()] = true;
            if node == to {
                break;
            }
            for (next, length) in self.successors(node) {
                if done[next.index()] {
                    continue;
                }
                let alt = cost + length;
                let known = dist[next.index()];
                let better = alt < known
                    || (alt == known && prev[next.index()].map_or(true, |p| node < p));
                if better {
                    dist[next.index()] = alt;
                    prev[next.index()] = Some(node);
                    heap.push(Frontier {
                        cost: alt,
                        node: next,
                    });
                }
            }
        }

        if !done[to.index()] {
            return vec![];
        }

        let mut path = vec![to];
        let mut node = to;
        while let Some(p) = prev[node.index()] {
            path.push(p);
            node = p;
        }
        path.reverse();
        path
    }

    /// Finds every node that can be reached from `from`, excluding `from` itself,
    /// in ascending order of node index.
    pub fn reachable_from(&self, from: NodeId) -> Vec<NodeId> {
        if from.index() >= self.nodes.len() {
            return vec![];
        }
        let parents = ::pathfinding::directed::dijkstra::dijkstra_all(&from, |id| {
            self.successors(*id)
                .map(|(id, _)| (id, 1usize))
                .collect::<Vec<_>>()
        });
        let mut nodes = parents
            .into_keys()
            .filter(|id| *id != from)
            .collect::<Vec<_>>();
        nodes.sort_unstable();
        nodes
    }

    /// Picks random reachable destinations from `from` until one yields a path,
    /// trying at most `attempts` times.
    pub fn random_route<R: Rng + ?Sized>(
        &self,
        from: NodeId,
        rng: &mut R,
        attempts: usize,
    ) -> Option<Vec<NodeId>> {
        let candidates = self.reachable_from(from);
        for _ in 0..attempts {
            let dst = *candidates.choose(rng)?;
            let path = self.find_path(from, dst);
            if !path.is_empty() {
                return Some(path);
            }
        }
        None
    }

    /// The nodes reachable by a single edge, with the edge lengths.
    fn successors(&self, node: NodeId) -> impl Iterator<Item = (NodeId, f64)> + '_ {
        self.edges_from(node)
            .flat_map(move |edge| edge.other(node).map(|next| (next, edge.length())))
    }
}
