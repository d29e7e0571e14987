//! Coordinate type definitions

use std::fmt;

/// Deepest zoom level accepted by the raster tile providers
pub const MAX_ZOOM: u8 = 22;

/// Tile coordinates in the Web Mercator / Slippy Map system.
///
/// Origin is the top-left (north-west) corner of the world; each zoom level
/// has `2^zoom` tiles per axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileCoord {
    /// X coordinate (east-west), 0 at west
    pub x: u32,
    /// Y coordinate (north-south), 0 at north
    pub y: u32,
    /// Zoom level
    pub zoom: u8,
}

impl TileCoord {
    pub const fn new(x: u32, y: u32, zoom: u8) -> Self {
        Self { x, y, zoom }
    }

    /// The four tiles covering this tile at `zoom + 1`.
    ///
    /// Order is top-left, top-right, bottom-left, bottom-right.
    #[inline]
    pub fn children(&self) -> [TileCoord; 4] {
        let (x, y, zoom) = (self.x * 2, self.y * 2, self.zoom + 1);
        [
            TileCoord::new(x, y, zoom),
            TileCoord::new(x + 1, y, zoom),
            TileCoord::new(x, y + 1, zoom),
            TileCoord::new(x + 1, y + 1, zoom),
        ]
    }

    /// Whether the tile index `(x, y)` at this tile's zoom lies within
    /// Chebyshev distance 1 of this tile.
    ///
    /// Indices outside the grid compare by plain difference, so nothing
    /// wraps around the antimeridian.
    #[inline]
    pub fn is_adjacent_index(&self, (x, y): (i64, i64)) -> bool {
        (x - i64::from(self.x)).abs() <= 1 && (y - i64::from(self.y)).abs() <= 1
    }

    /// Key used for this tile in logs, errors and exported JSON (`x_y_z`).
    pub fn key(&self) -> String {
        self.to_string()
    }

    /// Parses a key in `x_y_z` form.
    pub fn from_key(key: &str) -> Result<Self, CoordError> {
        let mut parts = key.split('_');
        let parsed = match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(x), Some(y), Some(z), None) => {
                match (x.parse(), y.parse(), z.parse()) {
                    (Ok(x), Ok(y), Ok(z)) => Some(TileCoord::new(x, y, z)),
                    _ => None,
                }
            }
            _ => None,
        };
        parsed.ok_or_else(|| CoordError::InvalidTileKey(key.to_string()))
    }
}

impl fmt::Display for TileCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}_{}", self.x, self.y, self.zoom)
    }
}

/// Errors that can occur when reading tile coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum CoordError {
    /// Tile key is not of the form `x_y_z`
    InvalidTileKey(String),
}

impl fmt::Display for CoordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoordError::InvalidTileKey(key) => {
                write!(f, "Invalid tile key: '{}' (expected x_y_z)", key)
            }
        }
    }
}

impl std::error::Error for CoordError {}
