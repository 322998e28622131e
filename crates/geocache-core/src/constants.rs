/// Latitude of the default origin cell (0, 0).
pub const ORIGIN_LAT: f64 = 36.997_936_938_057_016;

/// Longitude of the default origin cell (0, 0).
pub const ORIGIN_LNG: f64 = -122.057_035_075_011_51;

/// Edge length of one grid tile, in degrees.
pub const TILE_DEGREES: f64 = 1e-4;

/// Probability that any given cell holds a cache.
pub const CACHE_SPAWN_PROBABILITY: f64 = 0.1;

/// Upper bound (inclusive) of a cache's initial token value.
pub const MAX_INITIAL_TOKENS: u64 = 12;

/// Chebyshev radius, in cells, inside which caches are active.
pub const VISIBLE_RADIUS: i32 = 3;

/// Extra ring scanned around the visible square each pass.
pub const PREFETCH_RADIUS: i32 = 1;

/// Extra ring an active cache may drift into before it is torn down.
/// Zero means caches are hidden as soon as they leave the visible square.
pub const DESPAWN_BUFFER: i32 = 0;

/// Carried token value that wins the game.
pub const WIN_THRESHOLD: u64 = 32;

/// Version tag written alongside persisted mementos.
pub const MEMENTO_FORMAT_VERSION: u32 = 1;
