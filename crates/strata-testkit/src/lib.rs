//! Test support for the strata graph index.
//!
//! This crate provides tools for validating approximate search:
//! - Seeded random sources so every failing case can be replayed
//! - Property-based generators for point clouds (planar, uniform, tie-heavy)
//! - A brute-force recall oracle
//!
//! # Usage
//!
//! ```
//! use strata_testkit::{rng, RecallOracle};
//! use strata_metric::{planar_points, DistanceFunction};
//!
//! let mut rng = rng::seeded(7);
//! let points = planar_points(&mut rng, 50, 640, 480);
//!
//! let oracle = RecallOracle::new(2, DistanceFunction::Euclidean, &points);
//! let report = oracle.measure(&points[..5], |q| {
//!     // a perfect answerer: the query is one of the points
//!     points.iter().position(|p| p.as_slice() == q)
//! });
//! assert_eq!(report.recall(), 1.0);
//! ```

pub mod generators;
pub mod oracle;
pub mod rng;

pub use generators::{arb_cloud, arb_grid_cloud, arb_planar_cloud, arb_point};
pub use oracle::{RecallOracle, RecallReport};
