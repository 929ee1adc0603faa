//! Graph data structures for HNSW.
//!
//! Nodes live in a dense table indexed by id; edges are stored per layer as
//! `node id -> outgoing link list`. No node holds a reference to another.

use std::collections::HashMap;

/// Internal node ID (dense, for array indexing).
pub type NodeId = u32;

/// A node in the graph.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// Dense id, assigned at insertion and never reused.
    pub id: NodeId,
    /// The point this node stands for.
    pub position: Vec<f32>,
    /// Highest layer this node is present at. Fixed at creation.
    pub top_layer: usize,
}

impl Node {
    /// Whether the node is present at `layer` (every layer up to its top).
    pub fn is_present_at(&self, layer: usize) -> bool {
        layer <= self.top_layer
    }
}

/// A directed edge record, tagged with its layer and cached length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub from: NodeId,
    pub to: NodeId,
    pub layer: usize,
    pub distance: f32,
}

/// One outgoing link: target and cached distance from the owner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Link {
    pub to: NodeId,
    pub distance: f32,
}

/// Outgoing links of one node at one layer, in the order later expansions
/// observe them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Neighbors {
    links: Vec<Link>,
}

impl Neighbors {
    /// Append a link. Returns false (and changes nothing) if `to` is present.
    pub fn add(&mut self, to: NodeId, distance: f32) -> bool {
        if self.contains(to) {
            return false;
        }
        self.links.push(Link { to, distance });
        true
    }

    pub fn contains(&self, to: NodeId) -> bool {
        self.links.iter().any(|l| l.to == to)
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.links.iter().map(|l| l.to)
    }

    pub fn as_slice(&self) -> &[Link] {
        &self.links
    }

    /// Remove the link to `to`. Returns false if there was none.
    pub fn remove(&mut self, to: NodeId) -> bool {
        let before = self.links.len();
        self.links.retain(|l| l.to != to);
        self.links.len() != before
    }

    /// Order links nearest first, ties by lower id.
    pub fn sort_nearest(&mut self) {
        self.links.sort_by(|a, b| {
            a.distance
                .total_cmp(&b.distance)
                .then_with(|| a.to.cmp(&b.to))
        });
    }

    /// Keep the `cap` nearest links (ties by lower id), stored nearest first.
    ///
    /// Leaves the list untouched when it is already within the cap. Returns
    /// the number of links dropped.
    pub fn retain_nearest(&mut self, cap: usize) -> usize {
        if self.links.len() <= cap {
            return 0;
        }
        self.sort_nearest();
        let dropped = self.links.len() - cap;
        self.links.truncate(cap);
        dropped
    }
}

/// Graph storage for a single layer.
#[derive(Debug, Clone, Default)]
pub struct LayerGraph {
    /// Adjacency lists: node_id -> outgoing links
    adjacency: HashMap<NodeId, Neighbors>,
    /// Nodes present at this layer, ascending by id
    members: Vec<NodeId>,
}

impl LayerGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a node as present at this layer.
    pub fn join(&mut self, node_id: NodeId) {
        debug_assert!(self.members.last().map_or(true, |&last| last < node_id));
        self.members.push(node_id);
    }

    pub fn members(&self) -> &[NodeId] {
        &self.members
    }

    /// Outgoing links of a node; empty if it has none here.
    pub fn links(&self, node_id: NodeId) -> &[Link] {
        self.adjacency
            .get(&node_id)
            .map(Neighbors::as_slice)
            .unwrap_or(&[])
    }

    pub fn neighbors(&self, node_id: NodeId) -> Option<&Neighbors> {
        self.adjacency.get(&node_id)
    }

    pub fn neighbors_mut(&mut self, node_id: NodeId) -> Option<&mut Neighbors> {
        self.adjacency.get_mut(&node_id)
    }

    /// Add a directed edge. Returns false if it already existed.
    pub fn add_edge(&mut self, from: NodeId, to: NodeId, distance: f32) -> bool {
        self.adjacency.entry(from).or_default().add(to, distance)
    }

    pub fn out_degree(&self, node_id: NodeId) -> usize {
        self.adjacency.get(&node_id).map_or(0, Neighbors::len)
    }

    /// Number of directed edges at this layer.
    pub fn edge_count(&self) -> usize {
        self.adjacency.values().map(Neighbors::len).sum()
    }
}
