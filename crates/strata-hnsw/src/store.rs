//! Spatial index: the node table, per-layer adjacency and the entry point.
//!
//! Only CRUD-level primitives live here. The store knows nothing about
//! distances beyond the values it is handed to cache on each edge.

use crate::graph::{Link, Node, NodeId};
use crate::layer::Layers;
use crate::{HnswError, Result};
use std::collections::HashSet;

/// Owns every node and edge of one index.
#[derive(Debug, Clone)]
pub struct GraphStore {
    nodes: Vec<Node>,
    layers: Layers,
    entry_point: Option<NodeId>,
    max_layer: usize,
}

impl GraphStore {
    pub fn new(layer_count: usize) -> Self {
        Self {
            nodes: Vec::new(),
            layers: Layers::new(layer_count),
            entry_point: None,
            max_layer: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn layer_count(&self) -> usize {
        self.layers.num_layers()
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Append a node and register it at layers `0..=top_layer`.
    ///
    /// Ids are handed out densely in insertion order. `top_layer` is clamped
    /// to the highest layer.
    pub fn add_node(&mut self, position: Vec<f32>, top_layer: usize) -> NodeId {
        let id = self.nodes.len() as NodeId;
        let top_layer = top_layer.min(self.layer_count().saturating_sub(1));

        self.nodes.push(Node {
            id,
            position,
            top_layer,
        });
        self.layers.join_up_to(id, top_layer);

        if top_layer > self.max_layer {
            self.max_layer = top_layer;
        }
        id
    }

    /// Look up a node.
    pub fn node(&self, id: NodeId) -> Result<&Node> {
        self.nodes.get(id as usize).ok_or(HnswError::NotFound {
            id,
            len: self.nodes.len(),
        })
    }

    /// Position of a node known to exist.
    pub(crate) fn position(&self, id: NodeId) -> &[f32] {
        &self.nodes[id as usize].position
    }

    /// Ids reachable by one outgoing edge at `layer`, in adjacency order.
    pub fn neighbors(&self, id: NodeId, layer: usize) -> Result<Vec<NodeId>> {
        self.node(id)?;
        Ok(self
            .layers
            .get(layer)
            .and_then(|l| l.neighbors(id))
            .map(|n| n.ids().collect())
            .unwrap_or_default())
    }

    /// Outgoing links at `layer`; empty if none.
    pub fn links(&self, id: NodeId, layer: usize) -> &[Link] {
        self.layers.links(layer, id)
    }

    pub fn out_degree(&self, id: NodeId, layer: usize) -> usize {
        self.layers.get(layer).map_or(0, |l| l.out_degree(id))
    }

    /// Add the directed edge `from -> to` at `layer`.
    ///
    /// Returns `Ok(true)` if the edge was added, `Ok(false)` for a self-loop or
    /// an edge that already exists. Both endpoints must be present at `layer`.
    pub fn add_edge(&mut self, from: NodeId, to: NodeId, layer: usize, distance: f32) -> Result<bool> {
        let shared = self.node(from)?.top_layer.min(self.node(to)?.top_layer);
        if from == to {
            return Ok(false);
        }
        if layer > shared {
            return Err(HnswError::LayerNotShared { from, to, layer });
        }
        Ok(self.layers.add_edge_at(layer, from, to, distance))
    }

    /// Add `from -> to` for two nodes already known to share `layer`.
    pub(crate) fn link(&mut self, from: NodeId, to: NodeId, layer: usize, distance: f32) -> bool {
        from != to && self.layers.add_edge_at(layer, from, to, distance)
    }

    /// Trim the outgoing list of `id` at `layer` to its `cap` nearest links.
    pub fn retain_nearest(&mut self, id: NodeId, layer: usize, cap: usize) -> usize {
        self.layers
            .get_mut(layer)
            .and_then(|l| l.neighbors_mut(id))
            .map(|n| n.retain_nearest(cap))
            .unwrap_or(0)
    }

    /// Reorder the outgoing list of `id` at `layer` nearest first.
    pub fn sort_links(&mut self, id: NodeId, layer: usize) {
        if let Some(neighbors) = self.layers.get_mut(layer).and_then(|l| l.neighbors_mut(id)) {
            neighbors.sort_nearest();
        }
    }

    /// Remove the directed edge `from -> to` at `layer`, if present.
    pub fn unlink(&mut self, from: NodeId, to: NodeId, layer: usize) -> bool {
        self.layers
            .get_mut(layer)
            .and_then(|l| l.neighbors_mut(from))
            .map_or(false, |n| n.remove(to))
    }

    /// True if `to` is reachable from `from` at `layer` along some path that
    /// does not start with the direct edge `from -> to`.
    pub fn reaches_around(&self, from: NodeId, to: NodeId, layer: usize) -> bool {
        let mut seen = HashSet::from([from]);
        let mut frontier: Vec<NodeId> = Vec::new();
        for link in self.links(from, layer) {
            if link.to != to && seen.insert(link.to) {
                frontier.push(link.to);
            }
        }

        while let Some(id) = frontier.pop() {
            for link in self.links(id, layer) {
                if link.to == to {
                    return true;
                }
                if seen.insert(link.to) {
                    frontier.push(link.to);
                }
            }
        }
        false
    }

    pub fn entry_point(&self) -> Option<NodeId> {
        self.entry_point
    }

    pub(crate) fn set_entry_point(&mut self, id: NodeId) {
        self.entry_point = Some(id);
    }

    /// Highest top layer across all nodes (0 when empty).
    pub fn max_assigned_layer(&self) -> usize {
        self.max_layer
    }

    /// Ids present at `layer`, ascending. Empty for unknown layers.
    pub fn members(&self, layer: usize) -> &[NodeId] {
        self.layers.get(layer).map(|l| l.members()).unwrap_or(&[])
    }

    /// Total number of directed edge records across all layers.
    pub fn edge_count(&self) -> usize {
        self.layers.iter().map(|l| l.edge_count()).sum()
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.layers.clear();
        self.entry_point = None;
        self.max_layer = 0;
    }
}
