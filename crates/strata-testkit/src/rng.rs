//! Deterministic random sources.
//!
//! All fixtures draw from `StdRng` seeded explicitly. A run can be replayed
//! by exporting `STRATA_TEST_SEED`.

use rand::rngs::StdRng;
use rand::SeedableRng;

/// Seed used when `STRATA_TEST_SEED` is unset.
pub const DEFAULT_SEED: u64 = 0x5EED_2024;

pub fn seeded(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Seed from `STRATA_TEST_SEED`, falling back to [`DEFAULT_SEED`].
pub fn env_seed() -> u64 {
    std::env::var("STRATA_TEST_SEED")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_SEED)
}

/// `n` consecutive seeds starting at `base`, for sweeping a test over several
/// independent builds.
pub fn seeds(base: u64, n: usize) -> impl Iterator<Item = u64> {
    (0..n as u64).map(move |i| base.wrapping_add(i))
}
