//! HNSW layer management.
//!
//! Per-layer graph storage and the random level draw for new nodes.

use crate::graph::{LayerGraph, Link, NodeId};
use rand::Rng;

/// Manages the fixed stack of layers.
#[derive(Debug, Clone)]
pub struct Layers {
    /// Layer graphs (index 0 = bottom layer, highest index = top layer)
    layers: Vec<LayerGraph>,
}

impl Layers {
    /// Create `layer_count` empty layers.
    pub fn new(layer_count: usize) -> Self {
        Self {
            layers: (0..layer_count).map(|_| LayerGraph::new()).collect(),
        }
    }

    pub fn get(&self, layer: usize) -> Option<&LayerGraph> {
        self.layers.get(layer)
    }

    pub fn get_mut(&mut self, layer: usize) -> Option<&mut LayerGraph> {
        self.layers.get_mut(layer)
    }

    pub fn num_layers(&self) -> usize {
        self.layers.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LayerGraph> {
        self.layers.iter()
    }

    /// Register a node at every layer from 0 to `top_layer` inclusive.
    pub fn join_up_to(&mut self, node_id: NodeId, top_layer: usize) {
        for layer in self.layers.iter_mut().take(top_layer + 1) {
            layer.join(node_id);
        }
    }

    /// Outgoing links at a layer; empty for unknown layers or nodes.
    pub fn links(&self, layer: usize, node_id: NodeId) -> &[Link] {
        self.layers
            .get(layer)
            .map(|l| l.links(node_id))
            .unwrap_or(&[])
    }

    /// Add a directed edge at a layer. Returns false if it already existed
    /// or the layer does not exist.
    pub fn add_edge_at(&mut self, layer: usize, from: NodeId, to: NodeId, distance: f32) -> bool {
        self.layers
            .get_mut(layer)
            .map(|l| l.add_edge(from, to, distance))
            .unwrap_or(false)
    }

    pub fn clear(&mut self) {
        for layer in &mut self.layers {
            *layer = LayerGraph::new();
        }
    }
}

/// Draw the top layer for a new node.
///
/// Uses `floor(-ln(u) * m_L)` with `u` uniform in (0, 1) and
/// `m_L = 1 / ln(M)`, clamped to `layer_count - 1`. The probability of
/// reaching layer L is roughly `1 / M^L`, so most nodes stay at layer 0.
pub fn random_layer<R: Rng + ?Sized>(rng: &mut R, m: usize, layer_count: usize) -> usize {
    let m_l = 1.0 / (m as f64).ln();
    let ceiling = layer_count.saturating_sub(1);

    // gen() is in [0, 1); redraw the single value that would make ln blow up
    let uniform = loop {
        let u: f64 = rng.gen();
        if u > 0.0 {
            break u;
        }
    };

    let level = (-uniform.ln() * m_l).floor();
    if level.is_nan() || level >= ceiling as f64 {
        ceiling
    } else {
        level as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_layers_creation() {
        let layers = Layers::new(7);
        assert_eq!(layers.num_layers(), 7);
        assert!(layers.get(6).is_some());
        assert!(layers.get(7).is_none());
    }

    #[test]
    fn test_join_up_to() {
        let mut layers = Layers::new(4);
        layers.join_up_to(0, 2);
        layers.join_up_to(1, 0);

        assert_eq!(layers.get(0).unwrap().members(), &[0, 1]);
        assert_eq!(layers.get(2).unwrap().members(), &[0]);
        assert!(layers.get(3).unwrap().members().is_empty());
    }

    #[test]
    fn test_edge_operations() {
        let mut layers = Layers::new(4);
        assert!(layers.add_edge_at(0, 0, 1, 1.5));
        assert!(!layers.add_edge_at(0, 0, 1, 1.5));
        assert!(!layers.add_edge_at(9, 0, 1, 1.5));

        assert_eq!(layers.links(0, 0).len(), 1);
        assert!(layers.links(1, 0).is_empty());
        assert!(layers.links(9, 0).is_empty());
    }

    #[test]
    fn test_random_layer_distribution() {
        let mut rng = StdRng::seed_from_u64(1);
        let m = 5;
        let layer_count = 7;
        let mut counts = vec![0usize; layer_count];

        for _ in 0..10_000 {
            let layer = random_layer(&mut rng, m, layer_count);
            assert!(layer < layer_count);
            counts[layer] += 1;
        }

        // P(level >= 1) = 1/M, so layer 0 holds about 80%
        assert!(counts[0] > 7_500 && counts[0] < 8_500, "{:?}", counts);
        assert!(counts[0] > counts[1]);
        assert!(counts[1] > counts[2]);
    }

    #[test]
    fn test_random_layer_single_layer() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..100 {
            assert_eq!(random_layer(&mut rng, 5, 1), 0);
        }
    }

    #[test]
    fn test_random_layer_m_one_goes_to_top() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..100 {
            assert_eq!(random_layer(&mut rng, 1, 4), 3);
        }
    }

    #[test]
    fn test_random_layer_reproducible() {
        let draw = |seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            (0..64).map(|_| random_layer(&mut rng, 5, 7)).collect::<Vec<_>>()
        };
        assert_eq!(draw(11), draw(11));
    }
}
