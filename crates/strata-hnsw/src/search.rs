//! Bounded-beam search confined to one layer.
//!
//! One routine serves every caller; only the beam width `ef` changes. With
//! `ef = 1` it is a greedy descent, with `ef = M` it collects linking
//! candidates or a detailed base-layer answer.
//!
//! The frontier is ordered by ascending distance; equal distances keep the
//! order in which nodes were first queued. It is trimmed back to `ef` after
//! each expansion. The search ends when the frontier is empty, which only
//! covers what fit in the beam, not the whole connected component.

use crate::graph::NodeId;
use crate::store::GraphStore;
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashSet};
use strata_metric::Metric;

/// A node and its distance to the search target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub id: NodeId,
    pub distance: f32,
}

impl Neighbor {
    pub fn new(id: NodeId, distance: f32) -> Self {
        Self { id, distance }
    }
}

impl Eq for Neighbor {}

impl PartialOrd for Neighbor {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Neighbor {
    fn cmp(&self, other: &Self) -> Ordering {
        self.distance
            .total_cmp(&other.distance)
            .then_with(|| self.id.cmp(&other.id))
    }
}

/// Beam entry: distance first, then queue order.
#[derive(Debug, Clone, Copy)]
struct Ranked {
    distance: f32,
    seq: u64,
    id: NodeId,
}

impl PartialEq for Ranked {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Ranked {}

impl PartialOrd for Ranked {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Ranked {
    fn cmp(&self, other: &Self) -> Ordering {
        self.distance
            .total_cmp(&other.distance)
            .then_with(|| self.seq.cmp(&other.seq))
    }
}

/// Fixed-capacity ordered set of ranked nodes.
struct Beam {
    entries: BTreeSet<Ranked>,
    members: HashSet<NodeId>,
    capacity: usize,
}

impl Beam {
    fn new(capacity: usize) -> Self {
        Self {
            entries: BTreeSet::new(),
            members: HashSet::new(),
            capacity,
        }
    }

    fn contains(&self, id: NodeId) -> bool {
        self.members.contains(&id)
    }

    fn push(&mut self, entry: Ranked) {
        if self.members.insert(entry.id) {
            self.entries.insert(entry);
        }
    }

    fn pop_nearest(&mut self) -> Option<Ranked> {
        let entry = self.entries.pop_first()?;
        self.members.remove(&entry.id);
        Some(entry)
    }

    fn peek_nearest(&self) -> Option<&Ranked> {
        self.entries.first()
    }

    fn truncate(&mut self) {
        while self.entries.len() > self.capacity {
            if let Some(evicted) = self.entries.pop_last() {
                self.members.remove(&evicted.id);
            }
        }
    }

    fn into_sorted(self) -> Vec<Ranked> {
        self.entries.into_iter().collect()
    }
}

/// Outcome of one layer search.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerSearch {
    /// Closest node among those expanded.
    pub best: Neighbor,
    /// Up to `ef` closest nodes discovered, ascending by distance.
    pub nearest: Vec<Neighbor>,
    /// Nodes in the order they were expanded; starts with the entry.
    pub expansions: Vec<NodeId>,
    /// Distinct frontier heads in the order they surfaced; starts with the
    /// entry. This is the path a visualiser draws.
    pub route: Vec<NodeId>,
}

/// Search `layer` for nodes close to `target`, starting from `entry`.
///
/// `ef` is clamped to at least 1. `entry` must exist in `store`.
pub fn search_layer<D: Metric + ?Sized>(
    store: &GraphStore,
    metric: &D,
    target: &[f32],
    entry: NodeId,
    ef: usize,
    layer: usize,
) -> LayerSearch {
    let ef = ef.max(1);
    let distance_to = |id: NodeId| metric.distance(target, store.position(id));

    let mut seq = 0u64;
    let mut visited: HashSet<NodeId> = HashSet::new();
    let mut discovered: HashSet<NodeId> = HashSet::new();
    let mut frontier = Beam::new(ef);
    let mut results = Beam::new(ef);

    let start = Ranked {
        distance: distance_to(entry),
        seq,
        id: entry,
    };
    frontier.push(start);
    results.push(start);
    discovered.insert(entry);

    let mut best = Neighbor::new(entry, start.distance);
    let mut expansions = Vec::new();
    let mut route = vec![entry];
    let mut on_route: HashSet<NodeId> = HashSet::from([entry]);

    while let Some(current) = frontier.pop_nearest() {
        if !visited.insert(current.id) {
            continue;
        }
        expansions.push(current.id);

        if current.distance < best.distance {
            best = Neighbor::new(current.id, current.distance);
        }

        for link in store.links(current.id, layer) {
            let id = link.to;
            if visited.contains(&id) || frontier.contains(id) {
                continue;
            }
            seq += 1;
            let ranked = Ranked {
                distance: distance_to(id),
                seq,
                id,
            };
            frontier.push(ranked);
            if discovered.insert(id) {
                results.push(ranked);
            }
        }

        frontier.truncate();
        results.truncate();

        if let Some(head) = frontier.peek_nearest() {
            if on_route.insert(head.id) {
                route.push(head.id);
            }
        }
    }

    let nearest = results
        .into_sorted()
        .into_iter()
        .map(|r| Neighbor::new(r.id, r.distance))
        .collect();

    LayerSearch {
        best,
        nearest,
        expansions,
        route,
    }
}
