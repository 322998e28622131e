use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::{ORIGIN_LAT, ORIGIN_LNG, TILE_DEGREES};

/// A continuous geographic position in degrees.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

impl fmt::Display for LatLng {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6},{:.6}", self.lat, self.lng)
    }
}

/// Integer identity of one grid tile.
///
/// `x` runs along longitude (east positive), `y` along latitude
/// (north positive). The string form `"x,y"` is the persisted cell key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    pub x: i32,
    pub y: i32,
}

impl CellCoord {
    pub const ORIGIN: CellCoord = CellCoord { x: 0, y: 0 };

    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Chebyshev (king-move) distance: `max(|dx|, |dy|)`.
    pub fn chebyshev(self, other: CellCoord) -> u32 {
        let dx = (self.x as i64 - other.x as i64).unsigned_abs();
        let dy = (self.y as i64 - other.y as i64).unsigned_abs();
        dx.max(dy) as u32
    }

    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
        }
    }

    /// All cells within Chebyshev `radius` of `self`, row-major from the
    /// south-west corner.
    pub fn square(self, radius: i32) -> impl Iterator<Item = CellCoord> {
        let radius = radius.max(0);
        (-radius..=radius)
            .flat_map(move |dy| (-radius..=radius).map(move |dx| self.offset(dx, dy)))
    }
}

impl fmt::Display for CellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseCellError(String);

impl fmt::Display for ParseCellError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid cell key '{}'", self.0)
    }
}

impl std::error::Error for ParseCellError {}

impl FromStr for CellCoord {
    type Err = ParseCellError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseCellError(s.to_string());
        let (x, y) = s.split_once(',').ok_or_else(err)?;
        let x = x.trim().parse::<i32>().map_err(|_| err())?;
        let y = y.trim().parse::<i32>().map_err(|_| err())?;
        Ok(Self { x, y })
    }
}

/// Converts between geographic positions and grid cells.
///
/// Cell `(0, 0)` is centred on `origin`; each cell spans `tile_degrees`
/// in both latitude and longitude.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridMapper {
    origin: LatLng,
    tile_degrees: f64,
}

impl Default for GridMapper {
    fn default() -> Self {
        Self::new(LatLng::new(ORIGIN_LAT, ORIGIN_LNG), TILE_DEGREES)
    }
}

impl GridMapper {
    pub fn new(origin: LatLng, tile_degrees: f64) -> Self {
        let tile_degrees = if tile_degrees > 0.0 && tile_degrees.is_finite() {
            tile_degrees
        } else {
            TILE_DEGREES
        };
        Self {
            origin,
            tile_degrees,
        }
    }

    pub fn origin(&self) -> LatLng {
        self.origin
    }

    pub fn tile_degrees(&self) -> f64 {
        self.tile_degrees
    }

    /// The cell whose square contains `pos`. Boundaries round half up.
    pub fn to_cell(&self, pos: LatLng) -> CellCoord {
        let x = ((pos.lng - self.origin.lng) / self.tile_degrees + 0.5).floor();
        let y = ((pos.lat - self.origin.lat) / self.tile_degrees + 0.5).floor();
        CellCoord::new(x as i32, y as i32)
    }

    /// Geographic centre of `cell`.
    pub fn to_position(&self, cell: CellCoord) -> LatLng {
        LatLng::new(
            self.origin.lat + cell.y as f64 * self.tile_degrees,
            self.origin.lng + cell.x as f64 * self.tile_degrees,
        )
    }

    /// South-west and north-east corners of `cell`.
    pub fn cell_bounds(&self, cell: CellCoord) -> (LatLng, LatLng) {
        let center = self.to_position(cell);
        let half = self.tile_degrees / 2.0;
        (
            LatLng::new(center.lat - half, center.lng - half),
            LatLng::new(center.lat + half, center.lng + half),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn test_origin_maps_to_zero() {
        let mapper = GridMapper::default();
        assert_eq!(mapper.to_cell(mapper.origin()), CellCoord::ORIGIN);
    }

    #[test]
    fn test_axes() {
        let mapper = GridMapper::default();
        let north_east = LatLng::new(ORIGIN_LAT + 2.0 * TILE_DEGREES, ORIGIN_LNG + TILE_DEGREES);
        assert_eq!(mapper.to_cell(north_east), CellCoord::new(1, 2));

        let south_west = LatLng::new(ORIGIN_LAT - 3.0 * TILE_DEGREES, ORIGIN_LNG - TILE_DEGREES);
        assert_eq!(mapper.to_cell(south_west), CellCoord::new(-1, -3));
    }

    #[test]
    fn test_positions_inside_cell_share_it() {
        let mapper = GridMapper::new(LatLng::new(0.0, 0.0), 1.0);
        assert_eq!(mapper.to_cell(LatLng::new(0.49, -0.49)), CellCoord::ORIGIN);
        assert_eq!(mapper.to_cell(LatLng::new(0.5, 0.0)), CellCoord::new(0, 1));
        assert_eq!(mapper.to_cell(LatLng::new(-0.5, 0.0)), CellCoord::ORIGIN);
        assert_eq!(mapper.to_cell(LatLng::new(-0.51, 0.0)), CellCoord::new(0, -1));
    }

    #[test]
    fn test_to_position_is_center() {
        let mapper = GridMapper::default();
        let pos = mapper.to_position(CellCoord::new(3, -2));
        assert_relative_eq!(pos.lat, ORIGIN_LAT - 2.0 * TILE_DEGREES, epsilon = 1e-12);
        assert_relative_eq!(pos.lng, ORIGIN_LNG + 3.0 * TILE_DEGREES, epsilon = 1e-12);
    }

    #[test]
    fn test_cell_bounds_span_one_tile() {
        let mapper = GridMapper::default();
        let (sw, ne) = mapper.cell_bounds(CellCoord::new(5, 5));
        assert_relative_eq!(ne.lat - sw.lat, TILE_DEGREES, epsilon = 1e-12);
        assert_relative_eq!(ne.lng - sw.lng, TILE_DEGREES, epsilon = 1e-12);
    }

    #[test]
    fn test_invalid_tile_size_falls_back() {
        let mapper = GridMapper::new(LatLng::new(0.0, 0.0), 0.0);
        assert_eq!(mapper.tile_degrees(), TILE_DEGREES);
    }

    #[test]
    fn test_chebyshev() {
        let a = CellCoord::new(0, 0);
        assert_eq!(a.chebyshev(CellCoord::new(3, -1)), 3);
        assert_eq!(a.chebyshev(CellCoord::new(-2, 4)), 4);
        assert_eq!(a.chebyshev(a), 0);
        assert_eq!(
            CellCoord::new(i32::MIN, 0).chebyshev(CellCoord::new(i32::MAX, 0)),
            u32::MAX
        );
    }

    #[test]
    fn test_square_covers_radius() {
        let cells: Vec<_> = CellCoord::new(10, -10).square(2).collect();
        assert_eq!(cells.len(), 25);
        assert!(cells.iter().all(|c| c.chebyshev(CellCoord::new(10, -10)) <= 2));
        assert_eq!(CellCoord::ORIGIN.square(0).count(), 1);
    }

    #[test]
    fn test_key_roundtrip() {
        let cell = CellCoord::new(-3, 12);
        assert_eq!(cell.to_string(), "-3,12");
        assert_eq!("-3,12".parse::<CellCoord>().unwrap(), cell);
        assert_eq!(" 4 , 5 ".parse::<CellCoord>().unwrap(), CellCoord::new(4, 5));
    }

    #[test]
    fn test_key_rejects_garbage() {
        assert!("".parse::<CellCoord>().is_err());
        assert!("3".parse::<CellCoord>().is_err());
        assert!("a,b".parse::<CellCoord>().is_err());
        assert!("1,2,3".parse::<CellCoord>().is_err());
    }

    proptest! {
        #[test]
        fn prop_inverse_consistent(x in -1_000_000i32..1_000_000, y in -800_000i32..800_000) {
            let mapper = GridMapper::default();
            let cell = CellCoord::new(x, y);
            prop_assert_eq!(mapper.to_cell(mapper.to_position(cell)), cell);
        }
    }
}
