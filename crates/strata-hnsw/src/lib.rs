//! Incremental HNSW (Hierarchical Navigable Small World) index.
//!
//! Builds a multi-layer proximity graph one point at a time:
//!
//! - Every node receives a random top layer; higher layers are sparser
//!   (roughly `1 / M^L` of the nodes reach layer L)
//! - Each layer is a navigable small-world graph of bidirectional links,
//!   capped per node by nearest-first pruning
//! - Insertion and search both start at the entry point on the sparsest layer
//!   and descend
//!
//! # Architecture
//!
//! ```text
//! HnswIndex          insert / build_all / reset / marks
//!   ├─ query.rs      query, search(k), trace_path
//!   ├─ build.rs      IncrementalBuild (one insert per step)
//!   ├─ search.rs     bounded-beam layer search (ef = 1 greedy, ef = M beam)
//!   ├─ prune.rs      out-degree capping
//!   └─ store.rs      nodes, per-layer adjacency, entry point
//! ```
//!
//! The index is single-writer and synchronous. Progress is reported through a
//! [`strata_observe::Observer`] so a renderer can redraw between steps.
//!
//! # Parameters
//!
//! - `layer_count`: Number of layers (default: 7)
//! - `max_neighbors` (`M`): Links per node per layer and linking beam width
//!   (default: 5)
//! - `prune_cap`: Out-degree cap (default: `2 * M`)
//!
//! # Example
//!
//! ```
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//! use strata_hnsw::{HnswConfig, HnswIndex};
//! use strata_metric::DistanceFunction;
//!
//! let mut index = HnswIndex::new(
//!     2,
//!     DistanceFunction::Euclidean,
//!     HnswConfig::default(),
//!     StdRng::seed_from_u64(42),
//! )
//! .unwrap();
//!
//! index.insert(&[20.0, 20.0]).unwrap();
//! index.insert(&[80.0, 40.0]).unwrap();
//!
//! let hit = index.query(&[23.0, 24.0]).unwrap().unwrap();
//! assert_eq!(hit.node, 0);
//! assert!((hit.distance - 5.0).abs() < 1e-6);
//! ```

mod build;
mod config;
mod graph;
mod index;
mod invariants;
mod layer;
mod marks;
mod prune;
mod query;
mod search;
mod snapshot;
mod store;

pub use build::{BuildStep, IncrementalBuild};
pub use config::{HnswConfig, PruneScope};
pub use graph::{Edge, Link, Node, NodeId};
pub use index::{BuildPhase, HnswIndex};
pub use invariants::InvariantViolation;
pub use layer::random_layer;
pub use marks::SearchMarks;
pub use query::{PathTrace, QueryResult};
pub use search::{LayerSearch, Neighbor};
pub use snapshot::IndexSnapshot;

use strata_metric::MetricError;

/// Error type for HNSW operations.
#[derive(Debug, thiserror::Error)]
pub enum HnswError {
    #[error("Node not found: {id} (index holds {len} nodes)")]
    NotFound { id: NodeId, len: usize },

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Invalid point: {0}")]
    InvalidPoint(String),

    #[error("Nodes {from} and {to} do not share layer {layer}")]
    LayerNotShared {
        from: NodeId,
        to: NodeId,
        layer: usize,
    },
}

impl From<MetricError> for HnswError {
    fn from(err: MetricError) -> Self {
        match err {
            MetricError::DimensionMismatch { expected, actual } => {
                HnswError::DimensionMismatch { expected, actual }
            }
            MetricError::InvalidPoint(reason) => HnswError::InvalidPoint(reason),
        }
    }
}

/// Result type for HNSW operations.
pub type Result<T> = std::result::Result<T, HnswError>;
