use serde::{Deserialize, Serialize};

use crate::constants::{
    CACHE_SPAWN_PROBABILITY, DESPAWN_BUFFER, MAX_INITIAL_TOKENS, ORIGIN_LAT, ORIGIN_LNG,
    PREFETCH_RADIUS, TILE_DEGREES, VISIBLE_RADIUS, WIN_THRESHOLD,
};
use crate::grid::{GridMapper, LatLng};
use crate::ledger::TokenLedger;
use crate::oracle::LuckOracle;
use crate::window::WindowConfig;

/// Tunable gameplay parameters. Every field falls back to its default
/// when absent, so a partial TOML file is valid.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub seed: u64,
    pub origin_lat: f64,
    pub origin_lng: f64,
    pub tile_degrees: f64,
    pub spawn_probability: f64,
    pub max_tokens: u64,
    pub visible_radius: i32,
    pub prefetch_radius: i32,
    pub despawn_buffer: i32,
    pub win_threshold: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            origin_lat: ORIGIN_LAT,
            origin_lng: ORIGIN_LNG,
            tile_degrees: TILE_DEGREES,
            spawn_probability: CACHE_SPAWN_PROBABILITY,
            max_tokens: MAX_INITIAL_TOKENS,
            visible_radius: VISIBLE_RADIUS,
            prefetch_radius: PREFETCH_RADIUS,
            despawn_buffer: DESPAWN_BUFFER,
            win_threshold: WIN_THRESHOLD,
        }
    }
}

impl GameConfig {
    pub fn origin(&self) -> LatLng {
        LatLng::new(self.origin_lat, self.origin_lng)
    }

    pub fn mapper(&self) -> GridMapper {
        GridMapper::new(self.origin(), self.tile_degrees)
    }

    pub fn oracle(&self) -> LuckOracle {
        LuckOracle::new(self.seed, self.spawn_probability, self.max_tokens)
    }

    pub fn window(&self) -> WindowConfig {
        WindowConfig {
            visible_radius: self.visible_radius,
            prefetch_radius: self.prefetch_radius,
            despawn_buffer: self.despawn_buffer,
        }
    }

    pub fn ledger(&self) -> TokenLedger {
        TokenLedger::new(self.win_threshold)
    }
}
