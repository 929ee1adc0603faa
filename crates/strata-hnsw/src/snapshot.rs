//! Owned, read-only view of an index for rendering and inspection.

use crate::graph::{Edge, Node, NodeId};
use crate::marks::SearchMarks;
use crate::store::GraphStore;
use std::collections::{BTreeSet, VecDeque};

/// A copy of every node, edge and mark at one moment.
///
/// Edges are grouped per layer; within a layer they are ordered by ascending
/// source id, then by the source's adjacency order.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexSnapshot {
    pub nodes: Vec<Node>,
    pub edges: Vec<Vec<Edge>>,
    pub layers: Vec<Vec<NodeId>>,
    pub entry_point: Option<NodeId>,
    pub marks: SearchMarks,
}

impl IndexSnapshot {
    pub(crate) fn capture(store: &GraphStore, marks: &SearchMarks) -> Self {
        let mut edges = Vec::with_capacity(store.layer_count());
        let mut layers = Vec::with_capacity(store.layer_count());

        for layer in 0..store.layer_count() {
            let members = store.members(layer).to_vec();
            let layer_edges = members
                .iter()
                .flat_map(move |&from| {
                    store.links(from, layer).iter().map(move |link| Edge {
                        from,
                        to: link.to,
                        layer,
                        distance: link.distance,
                    })
                })
                .collect();
            edges.push(layer_edges);
            layers.push(members);
        }

        Self {
            nodes: store.nodes().to_vec(),
            edges,
            layers,
            entry_point: store.entry_point(),
            marks: marks.clone(),
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.iter().map(Vec::len).sum()
    }

    /// Edges at `layer`; empty for unknown layers.
    pub fn edges_at(&self, layer: usize) -> &[Edge] {
        self.edges.get(layer).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn out_degree(&self, id: NodeId, layer: usize) -> usize {
        self.edges_at(layer).iter().filter(|e| e.from == id).count()
    }

    /// Ids reachable from `start` by following outgoing edges at `layer`,
    /// `start` included.
    pub fn reachable_from(&self, start: NodeId, layer: usize) -> BTreeSet<NodeId> {
        let mut seen = BTreeSet::new();
        if (start as usize) >= self.nodes.len() {
            return seen;
        }

        let edges = self.edges_at(layer);
        let mut queue = VecDeque::from([start]);
        seen.insert(start);
        while let Some(id) = queue.pop_front() {
            for edge in edges.iter().filter(|e| e.from == id) {
                if seen.insert(edge.to) {
                    queue.push_back(edge.to);
                }
            }
        }
        seen
    }
}
