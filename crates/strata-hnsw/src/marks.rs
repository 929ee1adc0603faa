//! Transient search-visualization state.
//!
//! A renderer colours nodes that a search visited or that lie on the reported
//! path. These marks live beside the graph and are never read by insertion or
//! search.

use crate::graph::NodeId;
use std::collections::BTreeSet;

/// Visited / on-path marks for the most recent search a collaborator applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchMarks {
    visited: BTreeSet<NodeId>,
    on_path: Vec<NodeId>,
}

impl SearchMarks {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn mark_visited(&mut self, id: NodeId) {
        self.visited.insert(id);
    }

    /// Append to the path; a node already on it is not repeated.
    pub(crate) fn mark_on_path(&mut self, id: NodeId) {
        if !self.on_path.contains(&id) {
            self.on_path.push(id);
        }
    }

    pub fn is_visited(&self, id: NodeId) -> bool {
        self.visited.contains(&id)
    }

    pub fn is_on_path(&self, id: NodeId) -> bool {
        self.on_path.contains(&id)
    }

    pub fn visited(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.visited.iter().copied()
    }

    /// Path nodes in the order they were marked.
    pub fn path(&self) -> &[NodeId] {
        &self.on_path
    }

    pub fn is_empty(&self) -> bool {
        self.visited.is_empty() && self.on_path.is_empty()
    }

    pub fn clear(&mut self) {
        self.visited.clear();
        self.on_path.clear();
    }
}
