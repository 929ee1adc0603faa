//! HNSW index implementation.
//!
//! Owns the graph store, the random source and the observer. Insertion is a
//! coarse-to-fine descent followed by per-layer linking:
//!
//! ```text
//! layer epLayer .. L+1   greedy (ef = 1), refine the entry point
//! layer min(L, epLayer) .. 0
//!                        beam (ef = M), link to up to M candidates, prune
//! ```
//!
//! Every candidate is found before anything is written, so a rejected point
//! leaves the index exactly as it was.

use crate::config::HnswConfig;
use crate::graph::{Node, NodeId};
use crate::invariants::{self, InvariantViolation};
use crate::layer::random_layer;
use crate::marks::SearchMarks;
use crate::prune::prune_after_link;
use crate::search::{search_layer, Neighbor};
use crate::snapshot::IndexSnapshot;
use crate::store::GraphStore;
use crate::{HnswError, Result};
use rand::Rng;
use std::sync::Arc;
use strata_metric::{DistanceFunction, Metric};
use strata_observe::{IndexEvent, NoopObserver, Observer};

/// Construction state of an index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildPhase {
    /// No node inserted yet.
    Empty,
    /// At least one node; stays here for the index's lifetime.
    Growing,
}

/// Linking plan for one layer, computed before the node is written.
#[derive(Debug)]
struct LayerLinks {
    layer: usize,
    candidates: Vec<Neighbor>,
}

/// HNSW index.
///
/// Single-writer: `insert` takes `&mut self`, queries take `&self`, so the
/// borrow checker enforces "no readers during a write" for one instance.
/// Callers sharing an index across threads wrap it in a mutex.
pub struct HnswIndex<R, D = DistanceFunction> {
    /// Configuration
    config: HnswConfig,

    /// Point arity
    dimensions: usize,

    /// Distance function
    metric: D,

    /// Level draws; owned by this instance only
    rng: R,

    /// Nodes, per-layer adjacency and entry point
    store: GraphStore,

    /// Visualization marks, never read by the algorithm
    marks: SearchMarks,

    /// Progress notifications
    observer: Arc<dyn Observer>,
}

impl<R: Rng, D: Metric> HnswIndex<R, D> {
    /// Create an empty index.
    ///
    /// # Arguments
    ///
    /// * `dimensions` - Point arity (2 for planar points)
    /// * `metric` - Distance function
    /// * `config` - Layer count, fan-out and pruning parameters
    /// * `rng` - Random source for level draws; seed it for reproducible builds
    ///
    /// # Errors
    ///
    /// `InvalidConfiguration` if the config does not validate or
    /// `dimensions` is 0.
    pub fn new(dimensions: usize, metric: D, config: HnswConfig, rng: R) -> Result<Self> {
        config.validate()?;
        if dimensions == 0 {
            return Err(HnswError::InvalidConfiguration(
                "dimensions must be > 0".into(),
            ));
        }

        Ok(Self {
            store: GraphStore::new(config.layer_count),
            config,
            dimensions,
            metric,
            rng,
            marks: SearchMarks::new(),
            observer: Arc::new(NoopObserver),
        })
    }

    /// Attach an observer, replacing the current one.
    pub fn with_observer(mut self, observer: Arc<dyn Observer>) -> Self {
        self.observer = observer;
        self
    }

    pub fn set_observer(&mut self, observer: Arc<dyn Observer>) {
        self.observer = observer;
    }

    pub fn config(&self) -> &HnswConfig {
        &self.config
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    pub fn metric(&self) -> &D {
        &self.metric
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn phase(&self) -> BuildPhase {
        if self.store.is_empty() {
            BuildPhase::Empty
        } else {
            BuildPhase::Growing
        }
    }

    pub fn entry_point(&self) -> Option<NodeId> {
        self.store.entry_point()
    }

    /// Highest assigned layer across all nodes (0 when empty).
    pub fn max_assigned_layer(&self) -> usize {
        self.store.max_assigned_layer()
    }

    /// Look up a node; `NotFound` for ids outside `0..len`.
    pub fn node(&self, id: NodeId) -> Result<&Node> {
        self.store.node(id)
    }

    /// Outgoing neighbors of `id` at `layer`, in adjacency order.
    pub fn neighbors(&self, id: NodeId, layer: usize) -> Result<Vec<NodeId>> {
        self.store.neighbors(id, layer)
    }

    /// Ids present at `layer`, ascending.
    pub fn layer_members(&self, layer: usize) -> &[NodeId] {
        self.store.members(layer)
    }

    /// Total directed edge records across all layers.
    pub fn edge_count(&self) -> usize {
        self.store.edge_count()
    }

    /// Add the directed edge `from -> to` at `layer`, caching its length.
    ///
    /// Re-adding an existing edge and self-loops are no-ops (`Ok(false)`).
    pub fn add_edge(&mut self, from: NodeId, to: NodeId, layer: usize) -> Result<bool> {
        let distance = self
            .metric
            .distance(&self.store.node(from)?.position, &self.store.node(to)?.position);
        self.store.add_edge(from, to, layer, distance)
    }

    pub(crate) fn store(&self) -> &GraphStore {
        &self.store
    }

    pub(crate) fn emit(&self, event: IndexEvent) {
        self.observer.emit(event);
    }

    /// Reject points of the wrong arity or with non-finite coordinates.
    pub(crate) fn validate_point(&self, point: &[f32]) -> Result<()> {
        strata_metric::validate_point(point, self.dimensions).map_err(HnswError::from)
    }

    /// Insert one point and return its id.
    ///
    /// The first node becomes the entry point and gets no edges. Every later
    /// node is linked bidirectionally at each layer it shares with the
    /// current graph, then pruned. A node whose level exceeds the previous
    /// maximum becomes the new entry point.
    ///
    /// # Errors
    ///
    /// `DimensionMismatch` or `InvalidPoint` for malformed input; the index
    /// is left untouched.
    pub fn insert(&mut self, point: &[f32]) -> Result<NodeId> {
        self.validate_point(point)?;

        let level = random_layer(
            &mut self.rng,
            self.config.max_neighbors,
            self.config.layer_count,
        );

        let entry = match self.store.entry_point() {
            Some(entry) => entry,
            None => {
                let id = self.store.add_node(point.to_vec(), level);
                self.store.set_entry_point(id);
                self.emit(IndexEvent::EntryPointPromoted { id, layer: level });
                self.emit(IndexEvent::NodeAdded { id, layer: level });
                return Ok(id);
            }
        };

        let ep_layer = self.store.max_assigned_layer();
        let plan = self.plan_links(point, entry, level, ep_layer);

        let id = self.store.add_node(point.to_vec(), level);
        let cap = self.config.prune_cap();

        for LayerLinks { layer, candidates } in plan {
            let mut linked = Vec::with_capacity(candidates.len());
            for candidate in &candidates {
                self.store.link(id, candidate.id, layer, candidate.distance);
                self.store.link(candidate.id, id, layer, candidate.distance);
                linked.push(candidate.id);
            }

            let dropped =
                prune_after_link(&mut self.store, id, &linked, layer, cap, self.config.prune_scope);
            tracing::trace!(id, layer, linked = linked.len(), dropped, "linked node");
        }

        if level > ep_layer {
            self.store.set_entry_point(id);
            tracing::debug!(id, level, previous = entry, "entry point promoted");
            self.emit(IndexEvent::EntryPointPromoted { id, layer: level });
        }

        self.emit(IndexEvent::NodeAdded { id, layer: level });
        Ok(id)
    }

    /// Descend to the node's level, then collect linking candidates for every
    /// layer it shares with the graph, top first.
    fn plan_links(
        &self,
        point: &[f32],
        entry: NodeId,
        level: usize,
        ep_layer: usize,
    ) -> Vec<LayerLinks> {
        let mut ep = entry;

        for layer in (level + 1..=ep_layer).rev() {
            ep = search_layer(&self.store, &self.metric, point, ep, 1, layer)
                .best
                .id;
        }

        let mut plan = Vec::new();
        for layer in (0..=level.min(ep_layer)).rev() {
            let found = search_layer(
                &self.store,
                &self.metric,
                point,
                ep,
                self.config.max_neighbors,
                layer,
            );
            if let Some(nearest) = found.nearest.first() {
                ep = nearest.id;
            }
            plan.push(LayerLinks {
                layer,
                candidates: found.nearest,
            });
        }
        plan
    }

    /// Insert every point in order and return the node count.
    ///
    /// All points are validated first; if any is malformed nothing is
    /// inserted.
    pub fn build_all<I, P>(&mut self, points: I) -> Result<usize>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<[f32]>,
    {
        let points: Vec<P> = points.into_iter().collect();
        for point in &points {
            self.validate_point(point.as_ref())?;
        }

        for point in &points {
            self.insert(point.as_ref())?;
        }

        let count = self.store.len();
        tracing::debug!(count, "build complete");
        self.emit(IndexEvent::BuildComplete { count });
        Ok(count)
    }

    /// Drop every node and edge and return to [`BuildPhase::Empty`].
    ///
    /// Configuration, metric, random source and observer are kept.
    pub fn reset(&mut self) {
        self.store.clear();
        self.marks.clear();
        tracing::debug!("index reset");
        self.emit(IndexEvent::Reset);
    }

    /// Owned read-only view for a renderer.
    pub fn snapshot(&self) -> IndexSnapshot {
        IndexSnapshot::capture(&self.store, &self.marks)
    }

    /// Verify the structural invariants, including the out-degree cap when
    /// every list is pruned.
    pub fn check_invariants(&self) -> std::result::Result<(), InvariantViolation> {
        let cap = match self.config.prune_scope {
            crate::config::PruneScope::Both => Some(self.config.prune_cap()),
            crate::config::PruneScope::InsertedOnly => None,
        };
        invariants::check(&self.snapshot(), cap)
    }

    pub fn marks(&self) -> &SearchMarks {
        &self.marks
    }

    /// Mark a node as visited; `NotFound` for stale ids.
    pub fn mark_visited(&mut self, id: NodeId) -> Result<()> {
        self.store.node(id)?;
        self.marks.mark_visited(id);
        Ok(())
    }

    /// Mark a node as lying on the displayed path; `NotFound` for stale ids.
    pub fn mark_on_path(&mut self, id: NodeId) -> Result<()> {
        self.store.node(id)?;
        self.marks.mark_on_path(id);
        Ok(())
    }

    pub fn clear_marks(&mut self) {
        self.marks.clear();
    }
}
