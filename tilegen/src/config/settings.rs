//! Settings structs for all configuration sections.
//!
//! Each struct represents one `[section]` of the INI config file.

use crate::coord::TileCoord;
use crate::quadtree::{GeoPoint, QuadTreeConfig};
use std::path::PathBuf;

/// Complete application configuration loaded from config.ini.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigFile {
    /// Asset service credentials
    pub roblox: RobloxSettings,
    /// Raster tile provider credentials
    pub mapbox: MapboxSettings,
    /// Tile subdivision
    pub quadtree: QuadtreeSettings,
    /// Imagery post-processing
    pub imagery: ImagerySettings,
    /// Mesh generation
    pub mesh: MeshSettings,
    /// Run output location
    pub output: OutputSettings,
}

/// Asset service configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RobloxSettings {
    pub api_key: Option<String>,
    /// Creator user id stamped on every asset
    pub user_id: Option<String>,
    /// Attempts per create or poll request
    pub max_retries: u32,
}

/// MapBox configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapboxSettings {
    pub access_token: Option<String>,
    /// Attempts per tile download
    pub max_retries: u32,
}

/// Quadtree configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct QuadtreeSettings {
    pub root: TileCoord,
    pub max_lod: u8,
    /// Zoom at and beyond which every tile is subdivided
    pub lod_threshold: u8,
    /// Points of interest that force local subdivision
    pub points: Vec<GeoPoint>,
}

impl QuadtreeSettings {
    pub fn tree_config(&self, disable_lod: bool) -> QuadTreeConfig {
        QuadTreeConfig::new(self.max_lod, self.lod_threshold).with_disable_lod(disable_lod)
    }
}

/// Imagery configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagerySettings {
    /// Pixels of edge replication added on each side
    pub padding: u32,
}

/// Mesh configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MeshSettings {
    /// External generator command line; meshes cannot be built without it
    pub generator: Option<String>,
}

/// Output configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputSettings {
    /// Parent of the per-run directories
    pub directory: PathBuf,
}
