//! MapBox raster tiles.
//!
//! Fetches satellite imagery and terrain-DEM tiles via the Raster Tiles API.
//!
//! # URL Pattern
//!
//! `https://api.mapbox.com/v4/{tileset}/{z}/{x}/{y}@2x{format}?access_token={token}`
//!
//! - Uses standard XYZ tile coordinates
//! - `@2x` requests 512×512 tiles
//! - `format` carries the leading dot (`.jpg`, `.pngraw`)
//!
//! Terrain-DEM tiles do not exist over open ocean. MapBox answers those with
//! "Tile not found", and the client substitutes an all-black tile, which
//! decodes to the DEM's base elevation.

use super::{HttpClient, ProviderError};
use crate::coord::TileCoord;
use std::path::Path;
use tracing::{debug, warn};

/// Base URL for MapBox raster tiles.
const MAPBOX_BASE_URL: &str = "https://api.mapbox.com/v4";

/// Satellite imagery tileset.
pub const SATELLITE_TILESET: &str = "mapbox.satellite";

/// Terrain elevation tileset (terrain-RGB encoded).
pub const TERRAIN_DEM_TILESET: &str = "mapbox.mapbox-terrain-dem-v1";

/// Maximum zoom level served by the raster API for these tilesets.
const MAX_ZOOM: u8 = 22;

/// Edge length of an `@2x` tile.
const TILE_SIZE: u32 = 512;

/// MapBox raster tile client.
pub struct MapboxClient<C: HttpClient> {
    http_client: C,
    access_token: String,
    max_retries: u32,
}

impl<C: HttpClient> MapboxClient<C> {
    /// Creates a client with the given access token.
    ///
    /// # Arguments
    ///
    /// * `http_client` - HTTP client for making requests
    /// * `access_token` - MapBox access token
    /// * `max_retries` - Attempts per tile before giving up
    pub fn new(http_client: C, access_token: impl Into<String>, max_retries: u32) -> Self {
        Self {
            http_client,
            access_token: access_token.into(),
            max_retries: max_retries.max(1),
        }
    }

    fn build_url(&self, tileset: &str, tile: TileCoord, format: &str) -> String {
        format!(
            "{}/{}/{}/{}/{}@2x{}?access_token={}",
            MAPBOX_BASE_URL, tileset, tile.zoom, tile.x, tile.y, format, self.access_token
        )
    }

    /// Downloads one tile of `tileset` and writes it to `output`.
    pub fn fetch_tile(
        &self,
        tileset: &str,
        tile: TileCoord,
        format: &str,
        output: &Path,
    ) -> Result<(), ProviderError> {
        if tile.zoom > MAX_ZOOM {
            return Err(ProviderError::UnsupportedZoom(tile.zoom));
        }

        let url = self.build_url(tileset, tile, format);

        for attempt in 1..=self.max_retries {
            let response = match self.http_client.get(&url) {
                Ok(response) => response,
                Err(e) => {
                    warn!(attempt, "Tile {} request failed: {}", tile, e);
                    continue;
                }
            };

            if response.is_success() {
                return std::fs::write(output, &response.body)
                    .map_err(|e| ProviderError::Io(e.to_string()));
            }

            if tileset == TERRAIN_DEM_TILESET && response.text().contains("Tile not found") {
                debug!("No terrain for tile {}, writing flat tile", tile);
                return write_flat_tile(output);
            }

            warn!(
                attempt,
                status = response.status,
                "Tile {} request rejected",
                tile
            );
        }

        Err(ProviderError::TileUnavailable {
            x: tile.x,
            y: tile.y,
            zoom: tile.zoom,
        })
    }
}

fn write_flat_tile(output: &Path) -> Result<(), ProviderError> {
    image::RgbImage::new(TILE_SIZE, TILE_SIZE)
        .save_with_format(output, image::ImageFormat::Png)
        .map_err(|e| ProviderError::Io(e.to_string()))
}
