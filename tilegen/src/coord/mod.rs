//! Coordinate conversion module
//!
//! Provides the Web Mercator tile index of a geographic coordinate and the
//! tile coordinates used by the tile pyramid.

mod types;

pub use types::{CoordError, TileCoord, MAX_ZOOM};

use std::f64::consts::PI;

/// Web Mercator tile index of a geographic coordinate at `zoom`.
///
/// The index is neither validated nor clamped: longitude 180 lands one column
/// past the last tile and latitudes beyond the Mercator limit land outside
/// the row range. Fractional indices truncate toward zero.
#[inline]
pub fn tile_index(lat: f64, lon: f64, zoom: u8) -> (i64, i64) {
    let n = 2.0_f64.powi(zoom as i32);

    let x = (lon + 180.0) / 360.0 * n;

    let lat_rad = lat * PI / 180.0;
    let y = (1.0 - lat_rad.tan().asinh() / PI) / 2.0 * n;

    (x as i64, y as i64)
}
