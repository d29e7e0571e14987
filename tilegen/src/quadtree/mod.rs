//! Quad-subdivided tile pyramid.
//!
//! [`QuadTree`] builds a tree of [`Tile`] nodes from a root tile, refining
//! near points of interest and uniformly once a zoom threshold is reached.
//!
//! # Example
//!
//! ```
//! use tilegen::coord::TileCoord;
//! use tilegen::quadtree::{QuadTree, QuadTreeConfig};
//!
//! let config = QuadTreeConfig::new(3, 2);
//! let mut tree = QuadTree::new(TileCoord::new(0, 0, 0), &config);
//! tree.add_point(47.449, -122.3093);
//! tree.build_tree();
//! assert!(!tree.root().is_leaf());
//! ```

mod tile;

pub use tile::{Tile, TileIter};

use crate::coord::{tile_index, TileCoord};

/// A geographic point that locally increases level of detail.
///
/// Any pair is accepted. Points outside the Web Mercator range project off
/// the grid and only refine the tiles next to where they land.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Unclamped tile index of this point at `zoom`.
    fn index_at(&self, zoom: u8) -> (i64, i64) {
        tile_index(self.latitude, self.longitude, zoom)
    }
}

/// Subdivision parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuadTreeConfig {
    /// Deepest zoom level any tile may reach.
    pub max_lod: u8,
    /// Zoom at and beyond which every tile is subdivided regardless of points.
    pub subdivide_threshold: u8,
    /// Subdivide every tile down to `max_lod`, ignoring points and threshold.
    pub disable_lod: bool,
}

impl QuadTreeConfig {
    pub fn new(max_lod: u8, subdivide_threshold: u8) -> Self {
        Self {
            max_lod,
            subdivide_threshold,
            disable_lod: false,
        }
    }

    pub fn with_disable_lod(mut self, disable_lod: bool) -> Self {
        self.disable_lod = disable_lod;
        self
    }
}

/// Builder and owner of a tile pyramid.
#[derive(Debug, Clone)]
pub struct QuadTree {
    root: Tile,
    config: QuadTreeConfig,
    points: Vec<GeoPoint>,
}

impl QuadTree {
    pub fn new(root: TileCoord, config: &QuadTreeConfig) -> Self {
        Self {
            root: Tile::new(root),
            config: config.clone(),
            points: Vec::new(),
        }
    }

    /// Registers a point of interest. Must be called before [`build_tree`](Self::build_tree).
    pub fn add_point(&mut self, lat: f64, lon: f64) {
        self.points.push(GeoPoint::new(lat, lon));
    }

    pub fn points(&self) -> &[GeoPoint] {
        &self.points
    }

    pub fn root(&self) -> &Tile {
        &self.root
    }

    /// Subdivides the tree in place, starting at the root.
    pub fn build_tree(&mut self) {
        let Self {
            root,
            config,
            points,
        } = self;
        build_recurse(root, config, points);
    }
}

fn build_recurse(tile: &mut Tile, config: &QuadTreeConfig, points: &[GeoPoint]) {
    if tile.coord().zoom >= config.max_lod {
        return;
    }

    if tile.is_leaf() && should_subdivide(tile.coord(), config, points) {
        tile.subdivide();
    }

    for child in tile.children_mut() {
        build_recurse(child, config, points);
    }
}

/// First matching point is enough; subdividing is a yes/no outcome.
fn should_subdivide(coord: TileCoord, config: &QuadTreeConfig, points: &[GeoPoint]) -> bool {
    if config.disable_lod || coord.zoom >= config.subdivide_threshold {
        return true;
    }

    points
        .iter()
        .any(|point| coord.is_adjacent_index(point.index_at(coord.zoom)))
}

#[cfg(test)]
mod tests;
