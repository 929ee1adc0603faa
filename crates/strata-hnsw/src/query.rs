//! Read-only queries: top-down nearest neighbor, k-NN and the greedy path
//! trace a visualiser draws.

use crate::graph::NodeId;
use crate::index::HnswIndex;
use crate::search::{search_layer, Neighbor};
use crate::Result;
use rand::Rng;
use strata_metric::Metric;
use strata_observe::IndexEvent;

/// Answer to a nearest-neighbor query.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
    /// Approximate nearest node.
    pub node: NodeId,
    /// Its distance to the target.
    pub distance: f32,
    /// Base-layer nodes in the order they were expanded.
    pub expansions: Vec<NodeId>,
    /// Distinct base-layer frontier heads in the order they surfaced.
    pub route: Vec<NodeId>,
    /// Up to `M` closest nodes found at the base layer, ascending.
    pub candidates: Vec<Neighbor>,
}

/// Outcome of a greedy first-improvement walk at layer 0.
#[derive(Debug, Clone, PartialEq)]
pub struct PathTrace {
    /// Visited ids, entry point first, terminal last.
    pub path: Vec<NodeId>,
    pub terminal: NodeId,
    pub distance: f32,
}

impl PathTrace {
    /// Number of moves taken.
    pub fn hops(&self) -> usize {
        self.path.len().saturating_sub(1)
    }
}

impl<R: Rng, D: Metric> HnswIndex<R, D> {
    /// Greedy descent from the entry point down to layer 1.
    fn descend(&self, target: &[f32], entry: NodeId) -> NodeId {
        let store = self.store();
        let mut ep = entry;
        for layer in (1..store.layer_count()).rev() {
            ep = search_layer(store, self.metric(), target, ep, 1, layer).best.id;
        }
        ep
    }

    /// Approximate nearest neighbor of `target`.
    ///
    /// Descends from layer `layer_count - 1` to 1 with a beam of one, then
    /// searches layer 0 with a beam of `M`. Returns `None` for an empty index.
    ///
    /// # Errors
    ///
    /// `DimensionMismatch` or `InvalidPoint` for malformed targets.
    pub fn query(&self, target: &[f32]) -> Result<Option<QueryResult>> {
        self.validate_point(target)?;
        let Some(entry) = self.entry_point() else {
            return Ok(None);
        };

        let ep = self.descend(target, entry);
        let found = search_layer(
            self.store(),
            self.metric(),
            target,
            ep,
            self.config().max_neighbors,
            0,
        );

        let result = QueryResult {
            node: found.best.id,
            distance: found.best.distance,
            expansions: found.expansions,
            route: found.route,
            candidates: found.nearest,
        };

        tracing::trace!(
            node = result.node,
            distance = result.distance,
            expansions = result.expansions.len(),
            "query complete"
        );
        self.emit(IndexEvent::SearchComplete {
            node: result.node,
            distance: result.distance,
        });
        Ok(Some(result))
    }

    /// Up to `k` approximate nearest neighbors, ascending by distance.
    ///
    /// Same descent as [`query`](Self::query); the base-layer beam is
    /// `max(k, M)` wide. Empty for an empty index or `k == 0`.
    pub fn search(&self, target: &[f32], k: usize) -> Result<Vec<Neighbor>> {
        self.validate_point(target)?;
        let Some(entry) = self.entry_point() else {
            return Ok(Vec::new());
        };
        if k == 0 {
            return Ok(Vec::new());
        }

        let ep = self.descend(target, entry);
        let ef = k.max(self.config().max_neighbors);
        let mut nearest = search_layer(self.store(), self.metric(), target, ep, ef, 0).nearest;
        nearest.truncate(k);
        Ok(nearest)
    }

    /// Walk layer 0 from the entry point toward `target`.
    ///
    /// At each node the neighbors are scanned in adjacency order and the walk
    /// moves to the first one strictly closer to the target than the current
    /// node. It stops when no neighbor improves. Returns `None` for an empty
    /// index.
    pub fn trace_path(&self, target: &[f32]) -> Result<Option<PathTrace>> {
        self.validate_point(target)?;
        let Some(entry) = self.entry_point() else {
            return Ok(None);
        };

        let store = self.store();
        let distance_to = |id: NodeId| self.metric().distance(target, store.position(id));

        let mut current = entry;
        let mut current_distance = distance_to(entry);
        let mut path = vec![entry];

        loop {
            // strict decrease means no node can come back; the path check is
            // a guard for metrics that are not deterministic
            let step = store
                .links(current, 0)
                .iter()
                .filter(|link| !path.contains(&link.to))
                .map(|link| (link.to, distance_to(link.to)))
                .find(|&(_, d)| d < current_distance);

            match step {
                Some((next, d)) => {
                    current = next;
                    current_distance = d;
                    path.push(next);
                }
                None => break,
            }
        }

        let trace = PathTrace {
            path,
            terminal: current,
            distance: current_distance,
        };
        self.emit(IndexEvent::PathTraced {
            terminal: trace.terminal,
            distance: trace.distance,
            hops: trace.hops(),
        });
        Ok(Some(trace))
    }

    /// Replace the marks with a query's expansions (visited) and route
    /// (on path).
    pub fn apply_query(&mut self, result: &QueryResult) -> Result<()> {
        self.clear_marks();
        for &id in &result.expansions {
            self.mark_visited(id)?;
        }
        for &id in &result.route {
            self.mark_on_path(id)?;
        }
        Ok(())
    }

    /// Replace the marks with a trace; every path node counts as visited.
    pub fn apply_trace(&mut self, trace: &PathTrace) -> Result<()> {
        self.clear_marks();
        for &id in &trace.path {
            self.mark_visited(id)?;
            self.mark_on_path(id)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HnswConfig;
    use crate::HnswError;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use strata_metric::DistanceFunction;

    fn built(points: &[[f32; 2]], seed: u64) -> HnswIndex<StdRng> {
        let mut index = HnswIndex::new(
            2,
            DistanceFunction::Euclidean,
            HnswConfig::default(),
            StdRng::seed_from_u64(seed),
        )
        .unwrap();
        for p in points {
            index.insert(p).unwrap();
        }
        index
    }

    fn ring(n: usize) -> Vec<[f32; 2]> {
        (0..n)
            .map(|i| {
                let a = i as f32 * std::f32::consts::TAU / n as f32;
                [200.0 + 150.0 * a.cos(), 200.0 + 150.0 * a.sin()]
            })
            .collect()
    }

    #[test]
    fn test_empty_index() {
        let index = built(&[], 0);
        assert_eq!(index.query(&[1.0, 1.0]).unwrap(), None);
        assert_eq!(index.trace_path(&[1.0, 1.0]).unwrap(), None);
        assert!(index.search(&[1.0, 1.0], 3).unwrap().is_empty());
    }

    #[test]
    fn test_single_node() {
        let index = built(&[[20.0, 20.0]], 1);
        let result = index.query(&[23.0, 24.0]).unwrap().unwrap();
        assert_eq!(result.node, 0);
        assert!((result.distance - 5.0).abs() < 1e-6);

        let trace = index.trace_path(&[23.0, 24.0]).unwrap().unwrap();
        assert_eq!(trace.path, vec![0]);
        assert_eq!(trace.hops(), 0);
    }

    #[test]
    fn test_query_exact_position() {
        let points = ring(24);
        let index = built(&points, 2);
        for (i, p) in points.iter().enumerate() {
            let result = index.query(p).unwrap().unwrap();
            assert_eq!(result.node, i as NodeId);
            assert_eq!(result.distance, 0.0);
        }
    }

    #[test]
    fn test_query_expansions_start_at_descent_end() {
        let index = built(&ring(16), 3);
        let result = index.query(&[0.0, 0.0]).unwrap().unwrap();
        assert!(!result.expansions.is_empty());
        assert_eq!(result.route[0], result.expansions[0]);
        assert!(result.candidates.len() <= index.config().max_neighbors);
    }

    #[test]
    fn test_query_rejects_bad_target() {
        let index = built(&ring(4), 4);
        assert!(matches!(
            index.query(&[1.0, 2.0, 3.0]),
            Err(HnswError::DimensionMismatch { expected: 2, actual: 3 })
        ));
        assert!(index.trace_path(&[f32::INFINITY, 0.0]).is_err());
    }

    #[test]
    fn test_search_k() {
        let index = built(&ring(30), 5);
        let found = index.search(&[350.0, 200.0], 3).unwrap();
        assert_eq!(found.len(), 3);
        assert_eq!(found[0].id, 0);
        assert!(found.windows(2).all(|w| w[0].distance <= w[1].distance));
        assert!(index.search(&[350.0, 200.0], 0).unwrap().is_empty());
    }

    #[test]
    fn test_trace_takes_first_improvement() {
        // single layer so every node sits beside the entry point
        let config = HnswConfig::new().with_layer_count(1);
        let mut index = HnswIndex::new(
            2,
            DistanceFunction::Euclidean,
            config,
            StdRng::seed_from_u64(6),
        )
        .unwrap();
        index.insert(&[0.0, 0.0]).unwrap();
        index.insert(&[5.0, 0.0]).unwrap();
        index.insert(&[9.0, 0.0]).unwrap();

        // node 0 lists node 1 before node 2, so the first move goes to 1 even
        // though 2 is nearer to the target
        assert_eq!(index.neighbors(0, 0).unwrap(), vec![1, 2]);
        let trace = index.trace_path(&[10.0, 0.0]).unwrap().unwrap();
        assert_eq!(trace.path[..2], [0, 1]);
        assert_eq!(trace.terminal, *trace.path.last().unwrap());
    }

    #[test]
    fn test_trace_distance_strictly_decreases() {
        let index = built(&ring(40), 7);
        let target = [210.0, 60.0];
        let trace = index.trace_path(&target).unwrap().unwrap();

        let distances: Vec<f32> = trace
            .path
            .iter()
            .map(|&id| {
                let p = &index.node(id).unwrap().position;
                strata_metric::euclidean_distance(p, &target)
            })
            .collect();
        assert!(distances.windows(2).all(|w| w[1] < w[0]));
        assert_eq!(*distances.last().unwrap(), trace.distance);
    }

    #[test]
    fn test_apply_marks() {
        let mut index = built(&ring(12), 8);
        let result = index.query(&[50.0, 200.0]).unwrap().unwrap();
        index.apply_query(&result).unwrap();
        for id in &result.expansions {
            assert!(index.marks().is_visited(*id));
        }
        assert_eq!(index.marks().path(), result.route.as_slice());

        let trace = index.trace_path(&[50.0, 200.0]).unwrap().unwrap();
        index.apply_trace(&trace).unwrap();
        assert_eq!(index.marks().path(), trace.path.as_slice());
        assert_eq!(index.marks().visited().count(), trace.path.len());
    }
}
