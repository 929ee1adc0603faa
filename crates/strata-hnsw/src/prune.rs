//! Out-degree capping.
//!
//! Pruning keeps the `cap` outgoing links whose targets are nearest to the
//! owning node (ties by lower target id) and drops the rest. Only the owner's
//! outgoing record is touched; the reciprocal edge on the other side stays.
//!
//! A linked neighbor is trimmed more carefully than the inserted node: its
//! fresh link back to the inserted node is never dropped, and a link is only
//! dropped when its target stays reachable from the neighbor without it.

use crate::config::PruneScope;
use crate::graph::NodeId;
use crate::store::GraphStore;

/// Trim one node's outgoing list at one layer. Returns the links dropped.
pub fn prune_links(store: &mut GraphStore, id: NodeId, layer: usize, cap: usize) -> usize {
    if store.out_degree(id, layer) <= cap {
        return 0;
    }
    store.retain_nearest(id, layer, cap)
}

/// Trim a neighbor `id` that was just linked to `inserted`.
///
/// Links are dropped farthest first (ties by higher target id), skipping the
/// link to `inserted` and any link whose target is reachable only through
/// it. If every remaining link is such a bridge, the farthest one goes
/// anyway so the cap holds. The kept list is stored nearest first.
pub fn prune_neighbor(
    store: &mut GraphStore,
    id: NodeId,
    inserted: NodeId,
    layer: usize,
    cap: usize,
) -> usize {
    let excess = store.out_degree(id, layer).saturating_sub(cap);
    if excess == 0 {
        return 0;
    }
    store.sort_links(id, layer);

    let mut dropped = 0;
    while dropped < excess {
        let farthest_first: Vec<NodeId> = store
            .links(id, layer)
            .iter()
            .rev()
            .map(|l| l.to)
            .filter(|&to| to != inserted)
            .collect();

        let victim = match farthest_first
            .iter()
            .copied()
            .find(|&to| store.reaches_around(id, to, layer))
        {
            Some(to) => to,
            None => match farthest_first.first() {
                Some(&to) => {
                    tracing::debug!(id, to, layer, "dropping bridge link to hold the cap");
                    to
                }
                None => break,
            },
        };

        store.unlink(id, victim, layer);
        dropped += 1;
    }
    dropped
}

/// Prune after `inserted` was linked to `linked` at `layer`.
///
/// The inserted node is always pruned first. With [`PruneScope::Both`] each
/// linked neighbor follows, in candidate order, through [`prune_neighbor`].
pub fn prune_after_link(
    store: &mut GraphStore,
    inserted: NodeId,
    linked: &[NodeId],
    layer: usize,
    cap: usize,
    scope: PruneScope,
) -> usize {
    let mut dropped = prune_links(store, inserted, layer, cap);
    if scope == PruneScope::Both {
        for &neighbor in linked {
            dropped += prune_neighbor(store, neighbor, inserted, layer, cap);
        }
    }
    dropped
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A hub at the origin linked out to `n` spokes at x = 1..=n, and every
    /// spoke linked back.
    fn star(n: usize) -> GraphStore {
        let mut store = GraphStore::new(1);
        store.add_node(vec![0.0, 0.0], 0);
        for i in 1..=n {
            let id = store.add_node(vec![i as f32, 0.0], 0);
            store.add_edge(0, id, 0, i as f32).unwrap();
            store.add_edge(id, 0, 0, i as f32).unwrap();
        }
        store
    }

    #[test]
    fn test_prune_keeps_nearest() {
        let mut store = star(6);
        assert_eq!(prune_links(&mut store, 0, 0, 4), 2);
        assert_eq!(store.neighbors(0, 0).unwrap(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_prune_leaves_reciprocal_edges() {
        let mut store = star(6);
        prune_links(&mut store, 0, 0, 2);
        // spokes 5 and 6 lost the hub's edge to them but keep theirs
        assert_eq!(store.neighbors(6, 0).unwrap(), vec![0]);
        assert_eq!(store.out_degree(0, 0), 2);
    }

    #[test]
    fn test_prune_within_cap_is_noop() {
        let mut store = star(3);
        assert_eq!(prune_links(&mut store, 0, 0, 3), 0);
        assert_eq!(store.neighbors(0, 0).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_scope_inserted_only_skips_neighbors() {
        let mut store = star(5);
        // pretend spoke 1 was just inserted and linked to the hub
        let dropped = prune_after_link(&mut store, 1, &[0], 0, 2, PruneScope::InsertedOnly);
        assert_eq!(dropped, 0);
        assert_eq!(store.out_degree(0, 0), 5);
    }

    #[test]
    fn test_scope_both_trims_neighbors() {
        // every spoke is a bridge, so the cap wins
        let mut store = star(5);
        let dropped = prune_after_link(&mut store, 1, &[0], 0, 2, PruneScope::Both);
        assert_eq!(dropped, 3);
        assert_eq!(store.neighbors(0, 0).unwrap(), vec![1, 2]);
    }

    #[test]
    fn test_neighbor_keeps_fresh_link_and_reachability() {
        // hub 0 with near spokes 1, 2, 3 and a far node 4 that was just linked
        let mut store = GraphStore::new(1);
        for x in [0.0, 1.0, 2.0, 3.0, 9.0] {
            store.add_node(vec![x, 0.0], 0);
        }
        for to in 1..=4 {
            store.add_edge(0, to, 0, to as f32).unwrap();
        }
        store.add_edge(1, 3, 0, 2.0).unwrap();
        store.add_edge(4, 2, 0, 7.0).unwrap();
        store.add_edge(4, 0, 0, 9.0).unwrap();

        let dropped = prune_after_link(&mut store, 4, &[0], 0, 2, PruneScope::Both);
        assert_eq!(dropped, 2);
        // 3 is still reached through 1, and 2 through 4
        assert_eq!(store.neighbors(0, 0).unwrap(), vec![1, 4]);
        assert!(store.reaches_around(0, 2, 0));
        assert!(store.reaches_around(0, 3, 0));
    }

    #[test]
    fn test_neighbor_never_drops_inserted() {
        let mut store = star(4);
        // spoke 4 is the farthest and plays the inserted node
        let dropped = prune_neighbor(&mut store, 0, 4, 0, 1);
        assert_eq!(dropped, 3);
        assert_eq!(store.neighbors(0, 0).unwrap(), vec![4]);
    }
}
