//! Procedural cache world model.
//!
//! An unbounded grid of cells over geographic space. A seeded oracle decides
//! which cells hold a cache and what it starts with; a visibility window
//! realizes caches near the player; a memento store records what the player
//! changed and shadows the procedural baseline from then on.
//!
//! Zero I/O: persistence is reached only through the [`Backing`] trait.

pub mod config;
pub mod constants;
pub mod error;
pub mod grid;
pub mod ledger;
pub mod luck;
pub mod memento;
pub mod oracle;
pub mod presenter;
pub mod serde_compat;
pub mod time;
pub mod window;
pub mod world;

pub use config::GameConfig;
pub use constants::{
    CACHE_SPAWN_PROBABILITY, MAX_INITIAL_TOKENS, MEMENTO_FORMAT_VERSION, TILE_DEGREES,
    VISIBLE_RADIUS, WIN_THRESHOLD,
};
pub use error::{Result, WorldError};
pub use grid::{CellCoord, GridMapper, LatLng, ParseCellError};
pub use ledger::{Player, TokenLedger};
pub use luck::luck;
pub use memento::{Backing, CellMemento, MementoStore, MemoryBacking, decode_records, encode_records};
pub use oracle::{CacheBaseline, LuckOracle, SpawnOracle};
pub use presenter::{NullPresenter, Presenter};
pub use serde_compat::{WorldSnapshot, export_json, import_json};
pub use time::{now_iso8601, now_unix_secs, unix_to_iso8601};
pub use window::{VisibilityWindow, WindowConfig, WindowDiff};
pub use world::{Interaction, World};
