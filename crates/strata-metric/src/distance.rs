//! Distance functions over `f32` points.
//!
//! The graph only ever asks one question of its space: how far apart are two
//! points? [`Metric`] is that question. Lower values mean closer.
//!
//! Kernels work in chunks of four lanes so release builds auto-vectorize.

use serde::{Deserialize, Serialize};

/// A pluggable distance over points of equal arity.
///
/// Implementations must be deterministic: the same pair of points always
/// yields the same value, otherwise reproducible builds are lost.
pub trait Metric {
    /// Distance between `a` and `b` (lower = closer).
    fn distance(&self, a: &[f32], b: &[f32]) -> f32;
}

impl<F> Metric for F
where
    F: Fn(&[f32], &[f32]) -> f32,
{
    #[inline]
    fn distance(&self, a: &[f32], b: &[f32]) -> f32 {
        self(a, b)
    }
}

/// Built-in distance functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceFunction {
    /// Straight-line distance: sqrt(sum((a[i] - b[i])^2))
    #[default]
    Euclidean,
    /// Squared straight-line distance. Same ordering as `Euclidean`, no sqrt.
    SquaredEuclidean,
    /// 1 - cos(a, b), in [0, 2]
    Cosine,
    /// Negated dot product, so that larger dot products rank closer.
    InnerProduct,
}

impl Metric for DistanceFunction {
    #[inline]
    fn distance(&self, a: &[f32], b: &[f32]) -> f32 {
        match self {
            Self::Euclidean => euclidean_distance(a, b),
            Self::SquaredEuclidean => euclidean_distance_squared(a, b),
            Self::Cosine => cosine_distance(a, b),
            Self::InnerProduct => -inner_product(a, b),
        }
    }
}

/// Euclidean (L2) distance.
///
/// ```
/// use strata_metric::euclidean_distance;
///
/// let d = euclidean_distance(&[20.0, 20.0], &[23.0, 24.0]);
/// assert!((d - 5.0).abs() < 1e-6);
/// ```
#[inline]
pub fn euclidean_distance(a: &[f32], b: &[f32]) -> f32 {
    euclidean_distance_squared(a, b).sqrt()
}

/// Squared Euclidean distance.
#[inline]
pub fn euclidean_distance_squared(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len(), "point dimensions must match");

    let head = a.len() - a.len() % 4;
    let mut sum = 0.0f32;

    for (x, y) in a[..head].chunks_exact(4).zip(b[..head].chunks_exact(4)) {
        let d0 = x[0] - y[0];
        let d1 = x[1] - y[1];
        let d2 = x[2] - y[2];
        let d3 = x[3] - y[3];
        sum += d0 * d0 + d1 * d1 + d2 * d2 + d3 * d3;
    }

    for (x, y) in a[head..].iter().zip(&b[head..]) {
        let d = x - y;
        sum += d * d;
    }

    sum
}

/// Cosine distance, `1 - (a . b) / (|a| |b|)`.
///
/// Zero-length input is treated as orthogonal to everything (distance 1).
///
/// ```
/// use strata_metric::cosine_distance;
///
/// assert!((cosine_distance(&[1.0, 0.0], &[0.0, 2.0]) - 1.0).abs() < 1e-6);
/// assert!(cosine_distance(&[1.0, 1.0], &[2.0, 2.0]) < 1e-6);
/// ```
#[inline]
pub fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len(), "point dimensions must match");

    let (dot, norm_a, norm_b) = dot_and_norms(a, b);
    let denom = (norm_a * norm_b).sqrt();
    if denom < f32::EPSILON {
        return 1.0;
    }

    1.0 - (dot / denom).clamp(-1.0, 1.0)
}

/// Dot product.
#[inline]
pub fn inner_product(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len(), "point dimensions must match");

    let head = a.len() - a.len() % 4;
    let mut sum = 0.0f32;

    for (x, y) in a[..head].chunks_exact(4).zip(b[..head].chunks_exact(4)) {
        sum += x[0] * y[0] + x[1] * y[1] + x[2] * y[2] + x[3] * y[3];
    }

    for (x, y) in a[head..].iter().zip(&b[head..]) {
        sum += x * y;
    }

    sum
}

/// Dot product and both squared norms in one pass.
#[inline]
fn dot_and_norms(a: &[f32], b: &[f32]) -> (f32, f32, f32) {
    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;

    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    (dot, norm_a, norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_euclidean_planar() {
        assert!((euclidean_distance(&[0.0, 0.0], &[3.0, 4.0]) - 5.0).abs() < 1e-6);
        assert_eq!(euclidean_distance(&[7.0, 7.0], &[7.0, 7.0]), 0.0);
    }

    #[test]
    fn test_squared_matches_euclidean_ordering() {
        let origin = [0.0, 0.0, 0.0, 0.0, 0.0];
        let near = [1.0, 0.0, 0.0, 0.0, 1.0];
        let far = [2.0, 2.0, 0.0, 0.0, 2.0];

        let sq_near = euclidean_distance_squared(&origin, &near);
        let sq_far = euclidean_distance_squared(&origin, &far);
        assert!((sq_near - 2.0).abs() < 1e-6);
        assert!((sq_far - 12.0).abs() < 1e-6);
        assert!(euclidean_distance(&origin, &near) < euclidean_distance(&origin, &far));
    }

    #[test]
    fn test_chunk_remainder_handled() {
        // 7 lanes: one full chunk plus a remainder of three
        let a: Vec<f32> = (0..7).map(|i| i as f32).collect();
        let b: Vec<f32> = (0..7).map(|i| i as f32 + 2.0).collect();
        assert!((euclidean_distance_squared(&a, &b) - 28.0).abs() < 1e-4);
        assert!((inner_product(&a, &a) - 91.0).abs() < 1e-4);
    }

    #[test]
    fn test_cosine_bounds() {
        assert!(cosine_distance(&[1.0, 2.0], &[1.0, 2.0]) < 1e-6);
        assert!((cosine_distance(&[1.0, 0.0], &[-3.0, 0.0]) - 2.0).abs() < 1e-6);
        assert!((cosine_distance(&[0.0, 0.0], &[1.0, 1.0]) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_distance_function_dispatch() {
        let a = [1.0, 0.0];
        let b = [0.0, 1.0];

        let d = DistanceFunction::Euclidean.distance(&a, &b);
        assert!((d - std::f32::consts::SQRT_2).abs() < 1e-6);
        assert!((DistanceFunction::SquaredEuclidean.distance(&a, &b) - 2.0).abs() < 1e-6);
        assert!((DistanceFunction::Cosine.distance(&a, &b) - 1.0).abs() < 1e-6);
        assert!((DistanceFunction::InnerProduct.distance(&[2.0, 1.0], &[3.0, 1.0]) + 7.0).abs() < 1e-6);
    }

    #[test]
    fn test_closure_is_metric() {
        let manhattan = |a: &[f32], b: &[f32]| -> f32 {
            a.iter().zip(b).map(|(x, y)| (x - y).abs()).sum()
        };
        assert!((manhattan.distance(&[0.0, 0.0], &[3.0, 4.0]) - 7.0).abs() < 1e-6);
    }

    #[test]
    fn test_default_is_euclidean() {
        assert_eq!(DistanceFunction::default(), DistanceFunction::Euclidean);
    }
}
