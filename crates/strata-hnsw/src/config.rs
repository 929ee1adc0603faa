//! Index configuration.

use crate::{HnswError, Result};
use serde::{Deserialize, Serialize};

/// Which outgoing lists are trimmed after a node is linked at a layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PruneScope {
    /// Only the inserted node's list. Older neighbors keep every reverse edge
    /// they receive, so their out-degree can exceed the cap.
    InsertedOnly,
    /// The inserted node's list, then each linked neighbor's list.
    #[default]
    Both,
}

/// HNSW configuration parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HnswConfig {
    /// Number of layers; node levels are clamped to `layer_count - 1`.
    /// Default: 7
    pub layer_count: usize,

    /// Neighbor fan-out `M`: candidates linked per layer and the beam width
    /// used while linking.
    /// Default: 5
    pub max_neighbors: usize,

    /// Out-degree cap per node per layer. `None` means `2 * max_neighbors`.
    /// Default: None
    pub prune_cap: Option<usize>,

    /// Which lists are pruned after linking.
    /// Default: Both
    pub prune_scope: PruneScope,

    /// Incremental builds report progress every this many nodes (and on the
    /// last one).
    /// Default: 10
    pub progress_interval: usize,
}

impl Default for HnswConfig {
    fn default() -> Self {
        Self {
            layer_count: 7,
            max_neighbors: 5,
            prune_cap: None,
            prune_scope: PruneScope::Both,
            progress_interval: 10,
        }
    }
}

impl HnswConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_layer_count(mut self, layer_count: usize) -> Self {
        self.layer_count = layer_count;
        self
    }

    pub fn with_max_neighbors(mut self, m: usize) -> Self {
        self.max_neighbors = m;
        self
    }

    pub fn with_prune_cap(mut self, cap: usize) -> Self {
        self.prune_cap = Some(cap);
        self
    }

    pub fn with_prune_scope(mut self, scope: PruneScope) -> Self {
        self.prune_scope = scope;
        self
    }

    pub fn with_progress_interval(mut self, interval: usize) -> Self {
        self.progress_interval = interval;
        self
    }

    /// Effective out-degree cap.
    pub fn prune_cap(&self) -> usize {
        self.prune_cap
            .unwrap_or_else(|| self.max_neighbors.saturating_mul(2))
    }

    /// Level multiplier `mL = 1 / ln(M)`.
    ///
    /// Infinite for `M == 1`, which sends every node to the top layer.
    pub fn level_multiplier(&self) -> f64 {
        1.0 / (self.max_neighbors as f64).ln()
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        if self.layer_count == 0 {
            return Err(HnswError::InvalidConfiguration(
                "layer_count must be > 0".into(),
            ));
        }
        if self.max_neighbors == 0 {
            return Err(HnswError::InvalidConfiguration(
                "max_neighbors must be > 0".into(),
            ));
        }
        if self.prune_cap == Some(0) {
            return Err(HnswError::InvalidConfiguration(
                "prune_cap must be > 0".into(),
            ));
        }
        if self.progress_interval == 0 {
            return Err(HnswError::InvalidConfiguration(
                "progress_interval must be > 0".into(),
            ));
        }
        Ok(())
    }
}
