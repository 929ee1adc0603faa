//! Reproducible point clouds.
//!
//! All samplers take the random source by `&mut` so the caller keeps sole
//! ownership; the same seed always yields the same cloud.

use rand::Rng;

/// Inset kept free on every side of a planar canvas.
pub const PLANAR_MARGIN: u32 = 20;

/// Sample `n` integer-valued 2D points inside a `width` x `height` canvas.
///
/// Coordinates are drawn from `[PLANAR_MARGIN, width - PLANAR_MARGIN)` and
/// `[PLANAR_MARGIN, height - PLANAR_MARGIN)`. A canvas too small for the
/// margin collapses to the margin line itself.
pub fn planar_points<R: Rng + ?Sized>(
    rng: &mut R,
    n: usize,
    width: u32,
    height: u32,
) -> Vec<Vec<f32>> {
    (0..n)
        .map(|_| {
            let x = axis(rng, width);
            let y = axis(rng, height);
            vec![x as f32, y as f32]
        })
        .collect()
}

fn axis<R: Rng + ?Sized>(rng: &mut R, extent: u32) -> u32 {
    let hi = extent.saturating_sub(PLANAR_MARGIN);
    if hi <= PLANAR_MARGIN {
        PLANAR_MARGIN
    } else {
        rng.gen_range(PLANAR_MARGIN..hi)
    }
}

/// Sample `n` points with `dims` coordinates, each uniform in `[lo, hi)`.
pub fn uniform_points<R: Rng + ?Sized>(
    rng: &mut R,
    n: usize,
    dims: usize,
    lo: f32,
    hi: f32,
) -> Vec<Vec<f32>> {
    (0..n)
        .map(|_| (0..dims).map(|_| rng.gen_range(lo..hi)).collect())
        .collect()
}
