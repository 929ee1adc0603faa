//! Driver configuration.
//!
//! Loads and validates configuration from YAML files or environment variables.

use serde::{Deserialize, Serialize};
use strata_hnsw::HnswConfig;
use strata_metric::{DistanceFunction, PLANAR_MARGIN};

/// Driver configuration.
///
/// Example YAML:
/// ```yaml
/// seed: 7
/// points: 500
/// queries: 25
/// canvas:
///   width: 1280
///   height: 720
/// metric: euclidean
/// index:
///   layer_count: 7
///   max_neighbors: 5
///   prune_scope: both
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrataConfig {
    /// Seed for both the point sampler and the index's level draws
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Number of points to insert
    #[serde(default = "default_points")]
    pub points: usize,

    /// Number of random query targets
    #[serde(default = "default_queries")]
    pub queries: usize,

    /// Sampling area
    #[serde(default)]
    pub canvas: CanvasConfig,

    /// Distance function
    #[serde(default)]
    pub metric: DistanceFunction,

    /// Index parameters
    #[serde(default)]
    pub index: HnswConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanvasConfig {
    #[serde(default = "default_width")]
    pub width: u32,

    #[serde(default = "default_height")]
    pub height: u32,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
        }
    }
}

impl Default for StrataConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            points: default_points(),
            queries: default_queries(),
            canvas: CanvasConfig::default(),
            metric: DistanceFunction::default(),
            index: HnswConfig::default(),
        }
    }
}

fn default_seed() -> u64 {
    42
}

fn default_points() -> usize {
    200
}

fn default_queries() -> usize {
    20
}

fn default_width() -> u32 {
    1280
}

fn default_height() -> u32 {
    720
}

impl StrataConfig {
    /// Load configuration from a YAML file.
    pub fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(format!("Failed to read config file: {}", e)))?;

        let config: StrataConfig = serde_yaml::from_str(&content)
            .map_err(|e| ConfigError::ParseError(format!("Failed to parse YAML: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from environment variables.
    ///
    /// Supported variables (all optional):
    /// - STRATA_SEED
    /// - STRATA_POINTS
    /// - STRATA_QUERIES
    /// - STRATA_WIDTH
    /// - STRATA_HEIGHT
    pub fn load_from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = StrataConfig::default();

        if let Some(v) = lookup("STRATA_SEED") {
            config.seed = parse_var("STRATA_SEED", &v)?;
        }
        if let Some(v) = lookup("STRATA_POINTS") {
            config.points = parse_var("STRATA_POINTS", &v)?;
        }
        if let Some(v) = lookup("STRATA_QUERIES") {
            config.queries = parse_var("STRATA_QUERIES", &v)?;
        }
        if let Some(v) = lookup("STRATA_WIDTH") {
            config.canvas.width = parse_var("STRATA_WIDTH", &v)?;
        }
        if let Some(v) = lookup("STRATA_HEIGHT") {
            config.canvas.height = parse_var("STRATA_HEIGHT", &v)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let min_extent = 2 * PLANAR_MARGIN + 1;
        if self.canvas.width < min_extent || self.canvas.height < min_extent {
            return Err(ConfigError::InvalidField(format!(
                "canvas must be at least {}x{}",
                min_extent, min_extent
            )));
        }

        if self.queries > 0 && self.points == 0 {
            return Err(ConfigError::InvalidField(
                "queries need at least one point".to_string(),
            ));
        }

        self.index
            .validate()
            .map_err(|e| ConfigError::InvalidField(format!("index: {}", e)))?;

        Ok(())
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| ConfigError::ParseError(format!("{}={:?}: {}", key, value, e)))
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Invalid field: {0}")]
    InvalidField(String),
}
