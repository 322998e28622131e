use serde::{Deserialize, Serialize};

use crate::constants::{CACHE_SPAWN_PROBABILITY, MAX_INITIAL_TOKENS};
use crate::grid::CellCoord;
use crate::luck::luck;

/// Label appended to a cell key for the initial-value draw, so existence
/// and value come from independent streams.
const VALUE_LABEL: &str = "initialValue";

/// The procedural, never-stored default of a cell's cache.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheBaseline {
    pub exists: bool,
    pub initial_tokens: u64,
}

/// Decides where caches are and what they start with.
///
/// Implementations must be pure: identical cells always give identical
/// answers, so the world never needs to store an unrealized cell.
pub trait SpawnOracle {
    fn exists(&self, cell: CellCoord) -> bool;

    fn initial_tokens(&self, cell: CellCoord) -> u64;

    fn baseline(&self, cell: CellCoord) -> CacheBaseline {
        CacheBaseline {
            exists: self.exists(cell),
            initial_tokens: self.initial_tokens(cell),
        }
    }
}

/// Seeded oracle backed by [`luck`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LuckOracle {
    seed: u64,
    spawn_probability: f64,
    max_tokens: u64,
}

impl Default for LuckOracle {
    fn default() -> Self {
        Self::new(0, CACHE_SPAWN_PROBABILITY, MAX_INITIAL_TOKENS)
    }
}

impl LuckOracle {
    pub fn new(seed: u64, spawn_probability: f64, max_tokens: u64) -> Self {
        Self {
            seed,
            spawn_probability: spawn_probability.clamp(0.0, 1.0),
            max_tokens,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn max_tokens(&self) -> u64 {
        self.max_tokens
    }
}

impl SpawnOracle for LuckOracle {
    fn exists(&self, cell: CellCoord) -> bool {
        luck(self.seed, &cell.to_string()) < self.spawn_probability
    }

    fn initial_tokens(&self, cell: CellCoord) -> u64 {
        let draw = luck(self.seed, &format!("{cell},{VALUE_LABEL}"));
        let value = (draw * (self.max_tokens as f64 + 1.0)).floor() as u64;
        value.min(self.max_tokens)
    }
}
