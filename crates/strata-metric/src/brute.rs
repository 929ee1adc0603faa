//! Exact nearest-neighbor scan.
//!
//! O(n * d) per query. Used as ground truth when measuring how often the
//! approximate graph search lands on the true nearest point.

use crate::distance::{DistanceFunction, Metric};
use crate::{validate_point, Result};

/// A scan result: position of the point in the scanned slice and its distance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Match {
    /// Index into the slice that was scanned.
    pub index: usize,
    /// Distance to the query (lower = closer).
    pub distance: f32,
}

impl Match {
    pub fn new(index: usize, distance: f32) -> Self {
        Self { index, distance }
    }
}

impl Eq for Match {}

impl PartialOrd for Match {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Match {
    /// Ascending distance, then lower index.
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.distance
            .total_cmp(&other.distance)
            .then_with(|| self.index.cmp(&other.index))
    }
}

/// Brute-force scanner over a borrowed point set.
///
/// # Example
///
/// ```
/// use strata_metric::{BruteForce, DistanceFunction};
///
/// let points: Vec<Vec<f32>> = (0..10).map(|i| vec![i as f32, 0.0]).collect();
/// let exact = BruteForce::new(2, DistanceFunction::Euclidean);
///
/// let top = exact.k_nearest(&points, &[3.2, 0.0], 2).unwrap();
/// assert_eq!(top[0].index, 3);
/// assert_eq!(top[1].index, 4);
/// ```
#[derive(Debug, Clone)]
pub struct BruteForce<D = DistanceFunction> {
    dimensions: usize,
    metric: D,
}

impl<D: Metric> BruteForce<D> {
    pub fn new(dimensions: usize, metric: D) -> Self {
        Self { dimensions, metric }
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// The closest point to `query`, or `None` for an empty set.
    pub fn nearest<P: AsRef<[f32]>>(&self, points: &[P], query: &[f32]) -> Result<Option<Match>> {
        validate_point(query, self.dimensions)?;
        Ok(self.scan(points, query)?.into_iter().min())
    }

    /// The `k` closest points, ascending by distance.
    pub fn k_nearest<P: AsRef<[f32]>>(
        &self,
        points: &[P],
        query: &[f32],
        k: usize,
    ) -> Result<Vec<Match>> {
        validate_point(query, self.dimensions)?;
        if k == 0 {
            return Ok(Vec::new());
        }

        let mut matches = self.scan(points, query)?;
        matches.sort();
        matches.truncate(k);
        Ok(matches)
    }

    fn scan<P: AsRef<[f32]>>(&self, points: &[P], query: &[f32]) -> Result<Vec<Match>> {
        points
            .iter()
            .enumerate()
            .map(|(index, point)| {
                let point = point.as_ref();
                validate_point(point, self.dimensions)?;
                Ok(Match::new(index, self.metric.distance(query, point)))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MetricError;

    fn line(n: usize) -> Vec<Vec<f32>> {
        (0..n).map(|i| vec![i as f32, 0.0]).collect()
    }

    #[test]
    fn test_nearest_exact_hit() {
        let exact = BruteForce::new(2, DistanceFunction::Euclidean);
        let m = exact.nearest(&line(10), &[7.0, 0.0]).unwrap().unwrap();
        assert_eq!(m.index, 7);
        assert_eq!(m.distance, 0.0);
    }

    #[test]
    fn test_nearest_empty() {
        let exact = BruteForce::new(2, DistanceFunction::Euclidean);
        let empty: Vec<Vec<f32>> = Vec::new();
        assert!(exact.nearest(&empty, &[0.0, 0.0]).unwrap().is_none());
    }

    #[test]
    fn test_tie_prefers_lower_index() {
        let exact = BruteForce::new(2, DistanceFunction::Euclidean);
        let points = vec![vec![1.0, 0.0], vec![-1.0, 0.0]];
        let m = exact.nearest(&points, &[0.0, 0.0]).unwrap().unwrap();
        assert_eq!(m.index, 0);
    }

    #[test]
    fn test_k_nearest_sorted_and_truncated() {
        let exact = BruteForce::new(2, DistanceFunction::Euclidean);
        let top = exact.k_nearest(&line(10), &[0.0, 0.0], 3).unwrap();
        let ids: Vec<_> = top.iter().map(|m| m.index).collect();
        assert_eq!(ids, vec![0, 1, 2]);
        assert!(exact.k_nearest(&line(10), &[0.0, 0.0], 0).unwrap().is_empty());
    }

    #[test]
    fn test_query_dimension_checked() {
        let exact = BruteForce::new(2, DistanceFunction::Euclidean);
        let result = exact.nearest(&line(3), &[0.0, 0.0, 0.0]);
        assert!(matches!(result, Err(MetricError::DimensionMismatch { .. })));
    }

    #[test]
    fn test_custom_metric() {
        let chebyshev = |a: &[f32], b: &[f32]| -> f32 {
            a.iter().zip(b).map(|(x, y)| (x - y).abs()).fold(0.0, f32::max)
        };
        let exact = BruteForce::new(2, chebyshev);
        let points = vec![vec![3.0, 3.0], vec![0.0, 4.0]];
        // chebyshev: 3 vs 4
        let m = exact.nearest(&points, &[0.0, 0.0]).unwrap().unwrap();
        assert_eq!(m.index, 0);
    }
}
