//! Property-based point-cloud generators.
//!
//! Provides proptest strategies for:
//! - Single points with finite coordinates
//! - Uniform clouds of any arity
//! - Planar clouds with integer coordinates, like a canvas produces
//! - Grid clouds with many duplicate and equidistant points to exercise
//!   tie-breaking

use proptest::prelude::*;
use std::ops::Range;

/// Coordinate range used by the generic strategies.
pub const COORD_RANGE: Range<f32> = -1000.0..1000.0;

/// One point with `dims` finite coordinates.
pub fn arb_point(dims: usize) -> impl Strategy<Value = Vec<f32>> {
    prop::collection::vec(COORD_RANGE, dims)
}

/// A cloud of `count` points with `dims` coordinates each.
pub fn arb_cloud(dims: usize, count: Range<usize>) -> impl Strategy<Value = Vec<Vec<f32>>> {
    prop::collection::vec(arb_point(dims), count)
}

/// Integer-valued 2D points inside a `width` x `height` canvas.
pub fn arb_planar_cloud(
    width: u32,
    height: u32,
    count: Range<usize>,
) -> impl Strategy<Value = Vec<Vec<f32>>> {
    let point = (0..width.max(1), 0..height.max(1)).prop_map(|(x, y)| vec![x as f32, y as f32]);
    prop::collection::vec(point, count)
}

/// 2D points snapped to a `side` x `side` lattice with unit spacing.
///
/// Small lattices force repeated positions and equal distances.
pub fn arb_grid_cloud(side: u32, count: Range<usize>) -> impl Strategy<Value = Vec<Vec<f32>>> {
    arb_planar_cloud(side, side, count)
}
