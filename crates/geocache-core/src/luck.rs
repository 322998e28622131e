//! Deterministic pseudo-random draws keyed by strings.
//!
//! A key is hashed with FNV-1a (stable across platforms and runs, unlike
//! `std::hash`) into a seed for `ChaCha8Rng`, which yields the draw.
//! Both steps are portable, so the world layout survives target and
//! library changes.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

fn fnv1a(seed: u64, key: &str) -> u64 {
    seed.to_le_bytes()
        .iter()
        .chain(key.as_bytes())
        .fold(FNV_OFFSET, |hash, byte| {
            (hash ^ u64::from(*byte)).wrapping_mul(FNV_PRIME)
        })
}

/// Uniform draw in `[0, 1)` for `key` under world `seed`.
pub fn luck(seed: u64, key: &str) -> f64 {
    let mut rng = ChaCha8Rng::seed_from_u64(fnv1a(seed, key));
    rng.random::<f64>()
}
