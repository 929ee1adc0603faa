//! Structural checks over a snapshot.

use crate::graph::NodeId;
use crate::snapshot::IndexSnapshot;
use std::collections::HashSet;

/// The first broken structural rule found.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InvariantViolation {
    #[error("Node at position {position} has id {id}")]
    NonDenseId { position: usize, id: NodeId },

    #[error("Layer {layer} membership is wrong for node {id}")]
    Membership { id: NodeId, layer: usize },

    #[error("Self-loop on node {id} at layer {layer}")]
    SelfLoop { id: NodeId, layer: usize },

    #[error("Duplicate edge {from} -> {to} at layer {layer}")]
    DuplicateEdge {
        from: NodeId,
        to: NodeId,
        layer: usize,
    },

    #[error("Edge {from} -> {to} at layer {layer} references an unknown node")]
    DanglingEdge {
        from: NodeId,
        to: NodeId,
        layer: usize,
    },

    #[error("Edge {from} -> {to} at layer {layer} above a shared layer")]
    LayerNotShared {
        from: NodeId,
        to: NodeId,
        layer: usize,
    },

    #[error("Node {id} has {degree} links at layer {layer}, cap is {cap}")]
    DegreeExceeded {
        id: NodeId,
        layer: usize,
        degree: usize,
        cap: usize,
    },

    #[error("Entry point {entry:?} does not hold the highest layer {max_layer}")]
    EntryPoint {
        entry: Option<NodeId>,
        max_layer: usize,
    },
}

/// Check every structural invariant; `cap` additionally bounds out-degree.
pub fn check(snapshot: &IndexSnapshot, cap: Option<usize>) -> Result<(), InvariantViolation> {
    let nodes = &snapshot.nodes;

    for (position, node) in nodes.iter().enumerate() {
        if node.id as usize != position {
            return Err(InvariantViolation::NonDenseId {
                position,
                id: node.id,
            });
        }
    }

    for (layer, members) in snapshot.layers.iter().enumerate() {
        let expected: Vec<NodeId> = nodes
            .iter()
            .filter(|n| n.is_present_at(layer))
            .map(|n| n.id)
            .collect();
        if *members != expected {
            let first_diff = (0..members.len().max(expected.len()))
                .find(|&i| members.get(i) != expected.get(i))
                .unwrap_or(0);
            let id = expected
                .get(first_diff)
                .or_else(|| members.get(first_diff))
                .copied()
                .unwrap_or_default();
            return Err(InvariantViolation::Membership { id, layer });
        }
    }

    for (layer, edges) in snapshot.edges.iter().enumerate() {
        let mut seen = HashSet::with_capacity(edges.len());
        for edge in edges {
            let (from, to) = (edge.from, edge.to);
            let (Some(a), Some(b)) = (nodes.get(from as usize), nodes.get(to as usize)) else {
                return Err(InvariantViolation::DanglingEdge { from, to, layer });
            };
            if from == to {
                return Err(InvariantViolation::SelfLoop { id: from, layer });
            }
            if !seen.insert((from, to)) {
                return Err(InvariantViolation::DuplicateEdge { from, to, layer });
            }
            if layer > a.top_layer.min(b.top_layer) {
                return Err(InvariantViolation::LayerNotShared { from, to, layer });
            }
        }

        if let Some(cap) = cap {
            for &id in snapshot.layers.get(layer).map(Vec::as_slice).unwrap_or(&[]) {
                let degree = snapshot.out_degree(id, layer);
                if degree > cap {
                    return Err(InvariantViolation::DegreeExceeded {
                        id,
                        layer,
                        degree,
                        cap,
                    });
                }
            }
        }
    }

    let max_layer = nodes.iter().map(|n| n.top_layer).max();
    let entry_layer = snapshot
        .entry_point
        .and_then(|id| nodes.get(id as usize))
        .map(|n| n.top_layer);
    if entry_layer != max_layer {
        return Err(InvariantViolation::EntryPoint {
            entry: snapshot.entry_point,
            max_layer: max_layer.unwrap_or(0),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Edge;
    use crate::marks::SearchMarks;
    use crate::store::GraphStore;

    fn valid() -> IndexSnapshot {
        let mut store = GraphStore::new(2);
        store.add_node(vec![0.0], 1);
        store.add_node(vec![1.0], 0);
        store.add_edge(0, 1, 0, 1.0).unwrap();
        store.add_edge(1, 0, 0, 1.0).unwrap();
        store.set_entry_point(0);
        IndexSnapshot::capture(&store, &SearchMarks::new())
    }

    fn edge(from: NodeId, to: NodeId, layer: usize) -> Edge {
        Edge {
            from,
            to,
            layer,
            distance: 1.0,
        }
    }

    #[test]
    fn test_valid_snapshot() {
        assert_eq!(check(&valid(), Some(1)), Ok(()));
    }

    #[test]
    fn test_empty_snapshot() {
        let snapshot = IndexSnapshot::capture(&GraphStore::new(3), &SearchMarks::new());
        assert_eq!(check(&snapshot, Some(4)), Ok(()));
    }

    #[test]
    fn test_detects_violations() {
        let mut s = valid();
        s.edges[0].push(edge(1, 1, 0));
        assert_eq!(
            check(&s, None),
            Err(InvariantViolation::SelfLoop { id: 1, layer: 0 })
        );

        let mut s = valid();
        s.edges[0].push(edge(0, 1, 0));
        assert!(matches!(
            check(&s, None),
            Err(InvariantViolation::DuplicateEdge { .. })
        ));

        let mut s = valid();
        s.edges[1].push(edge(0, 1, 1));
        assert!(matches!(
            check(&s, None),
            Err(InvariantViolation::LayerNotShared { .. })
        ));

        let mut s = valid();
        s.edges[0].push(edge(0, 7, 0));
        assert!(matches!(
            check(&s, None),
            Err(InvariantViolation::DanglingEdge { .. })
        ));

        let mut s = valid();
        s.entry_point = Some(1);
        assert!(matches!(
            check(&s, None),
            Err(InvariantViolation::EntryPoint { .. })
        ));

        let mut s = valid();
        s.layers[1].push(1);
        assert_eq!(
            check(&s, None),
            Err(InvariantViolation::Membership { id: 1, layer: 1 })
        );
    }

    #[test]
    fn test_degree_cap_optional() {
        let mut s = valid();
        s.nodes.push(crate::graph::Node {
            id: 2,
            position: vec![2.0],
            top_layer: 0,
        });
        s.layers[0].push(2);
        s.edges[0].push(edge(0, 2, 0));

        assert_eq!(check(&s, None), Ok(()));
        assert!(matches!(
            check(&s, Some(1)),
            Err(InvariantViolation::DegreeExceeded { id: 0, degree: 2, .. })
        ));
    }
}
