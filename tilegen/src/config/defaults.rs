//! Default values and constants for all configuration settings.

use std::path::PathBuf;

use super::settings::*;
use crate::coord::TileCoord;
use crate::quadtree::GeoPoint;

// =============================================================================
// Retry defaults
// =============================================================================

/// Attempts per asset service request.
pub const DEFAULT_ROBLOX_MAX_RETRIES: u32 = 15;

/// Attempts per tile download.
pub const DEFAULT_MAPBOX_MAX_RETRIES: u32 = 15;

// =============================================================================
// Quadtree defaults
// =============================================================================

pub const DEFAULT_ROOT: TileCoord = TileCoord::new(0, 0, 0);

pub const DEFAULT_MAX_LOD: u8 = 2;

pub const DEFAULT_LOD_THRESHOLD: u8 = 11;

/// Default points of interest: ten major US airports as (ICAO, lat, lon).
pub const DEFAULT_AIRPORTS: [(&str, f64, f64); 10] = [
    ("KATL", 33.6367, -84.4281),
    ("KLAX", 33.9425, -118.4081),
    ("KORD", 41.9786, -87.9048),
    ("KDFW", 32.8968, -97.0380),
    ("KDEN", 39.8617, -104.6731),
    ("KJFK", 40.6398, -73.7789),
    ("KSFO", 37.6190, -122.3749),
    ("KSEA", 47.4490, -122.3093),
    ("KLAS", 36.0801, -115.1522),
    ("KMIA", 25.7932, -80.2906),
];

pub fn default_points() -> Vec<GeoPoint> {
    DEFAULT_AIRPORTS
        .iter()
        .map(|&(_, lat, lon)| GeoPoint::new(lat, lon))
        .collect()
}

// =============================================================================
// Imagery / output defaults
// =============================================================================

pub const DEFAULT_IMAGE_PADDING: u32 = 16;

pub const DEFAULT_OUTPUT_DIR: &str = "output";

// =============================================================================
// Environment overrides
// =============================================================================

pub const ENV_ROBLOX_API_KEY: &str = "ROBLOX_API_KEY";
pub const ENV_ROBLOX_USER_ID: &str = "ROBLOX_USER_ID";
pub const ENV_MAPBOX_API_KEY: &str = "MAPBOX_API_KEY";

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            roblox: RobloxSettings {
                api_key: None,
                user_id: None,
                max_retries: DEFAULT_ROBLOX_MAX_RETRIES,
            },
            mapbox: MapboxSettings {
                access_token: None,
                max_retries: DEFAULT_MAPBOX_MAX_RETRIES,
            },
            quadtree: QuadtreeSettings {
                root: DEFAULT_ROOT,
                max_lod: DEFAULT_MAX_LOD,
                lod_threshold: DEFAULT_LOD_THRESHOLD,
                points: default_points(),
            },
            imagery: ImagerySettings {
                padding: DEFAULT_IMAGE_PADDING,
            },
            mesh: MeshSettings::default(),
            output: OutputSettings {
                directory: PathBuf::from(DEFAULT_OUTPUT_DIR),
            },
        }
    }
}
