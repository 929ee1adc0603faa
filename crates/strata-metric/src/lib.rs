//! Metric space adapter for strata.
//!
//! Supplies the two things a small-world graph needs from the space its
//! points live in:
//!
//! - **Distance**: a [`Metric`] implementation. [`DistanceFunction`] covers the
//!   common cases (Euclidean, squared Euclidean, cosine, inner product) and any
//!   `Fn(&[f32], &[f32]) -> f32` closure is accepted as well.
//! - **Points**: samplers that produce reproducible point clouds from a
//!   caller-owned random source ([`planar_points`], [`uniform_points`]).
//!
//! [`BruteForce`] performs an exact linear scan and serves as the ground truth
//! when measuring how close an approximate search got.
//!
//! # Example
//!
//! ```
//! use strata_metric::{BruteForce, DistanceFunction, Metric};
//!
//! let points = vec![vec![0.0, 0.0], vec![3.0, 4.0], vec![1.0, 1.0]];
//! assert_eq!(DistanceFunction::Euclidean.distance(&points[0], &points[1]), 5.0);
//!
//! let exact = BruteForce::new(2, DistanceFunction::Euclidean);
//! let nearest = exact.nearest(&points, &[0.9, 0.9]).unwrap().unwrap();
//! assert_eq!(nearest.index, 2);
//! ```

mod brute;
mod distance;
mod sample;

pub use brute::{BruteForce, Match};
pub use distance::{
    cosine_distance, euclidean_distance, euclidean_distance_squared, inner_product,
    DistanceFunction, Metric,
};
pub use sample::{planar_points, uniform_points, PLANAR_MARGIN};

/// Error type for metric operations.
#[derive(Debug, thiserror::Error)]
pub enum MetricError {
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Invalid point: {0}")]
    InvalidPoint(String),
}

/// Result type for metric operations.
pub type Result<T> = std::result::Result<T, MetricError>;

/// Check a point's arity and reject non-finite coordinates.
pub fn validate_point(point: &[f32], dimensions: usize) -> Result<()> {
    if point.len() != dimensions {
        return Err(MetricError::DimensionMismatch {
            expected: dimensions,
            actual: point.len(),
        });
    }

    for (i, &v) in point.iter().enumerate() {
        if v.is_nan() {
            return Err(MetricError::InvalidPoint(format!("NaN at index {}", i)));
        }
        if v.is_infinite() {
            return Err(MetricError::InvalidPoint(format!("Inf at index {}", i)));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_point() {
        assert!(validate_point(&[1.0, 2.0], 2).is_ok());

        match validate_point(&[1.0], 2) {
            Err(MetricError::DimensionMismatch { expected, actual }) => {
                assert_eq!(expected, 2);
                assert_eq!(actual, 1);
            }
            other => panic!("unexpected result: {:?}", other),
        }

        assert!(matches!(
            validate_point(&[f32::NAN, 0.0], 2),
            Err(MetricError::InvalidPoint(_))
        ));
        assert!(matches!(
            validate_point(&[0.0, f32::INFINITY], 2),
            Err(MetricError::InvalidPoint(_))
        ));
    }
}
