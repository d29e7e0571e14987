//! Satellite imagery upload strategy.
//!
//! Each tile is downloaded as JPEG, padded by replicating its border pixels
//! outward (so texture filtering at tile seams samples the tile's own edge
//! colour instead of black), and uploaded as an image asset.

use crate::assets::{asset_display_name, CollaboratorError, TileUploader};
use crate::coord::TileCoord;
use crate::opencloud::{AssetCreator, AssetType, ContentType};
use crate::provider::{HttpClient, MapboxClient, SATELLITE_TILESET};
use image::{ImageError, RgbImage};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Pads the image at `path` by `padding` pixels on every side, in place.
///
/// Border rows and columns are copied outward; each corner block takes the
/// colour of the matching corner pixel.
pub fn extend_image_edges(path: &Path, padding: u32) -> Result<(), ImageError> {
    let source = image::open(path)?.to_rgb8();
    padded(&source, padding).save(path)
}

fn padded(source: &RgbImage, padding: u32) -> RgbImage {
    let (width, height) = source.dimensions();
    if width == 0 || height == 0 {
        return source.clone();
    }

    RgbImage::from_fn(width + 2 * padding, height + 2 * padding, |x, y| {
        let sx = x.saturating_sub(padding).min(width - 1);
        let sy = y.saturating_sub(padding).min(height - 1);
        *source.get_pixel(sx, sy)
    })
}

/// Uploads satellite imagery for one tile.
pub struct ImageryUploader<C: HttpClient, A: AssetCreator> {
    mapbox: MapboxClient<C>,
    assets: Arc<A>,
    scratch: PathBuf,
    padding: u32,
}

impl<C: HttpClient, A: AssetCreator> ImageryUploader<C, A> {
    /// `scratch` is overwritten for every tile.
    pub fn new(
        mapbox: MapboxClient<C>,
        assets: Arc<A>,
        scratch: impl Into<PathBuf>,
        padding: u32,
    ) -> Self {
        Self {
            mapbox,
            assets,
            scratch: scratch.into(),
            padding,
        }
    }
}

impl<C: HttpClient, A: AssetCreator> TileUploader for ImageryUploader<C, A> {
    fn upload(&self, tile: TileCoord) -> Result<String, CollaboratorError> {
        self.mapbox
            .fetch_tile(SATELLITE_TILESET, tile, ".jpg", &self.scratch)?;
        extend_image_edges(&self.scratch, self.padding)?;
        debug!(padding = self.padding, "Padded imagery for tile {}", tile);

        let operation_id = self.assets.create_asset(
            &self.scratch,
            AssetType::Image,
            ContentType::Jpeg,
            &asset_display_name(tile),
        )?;
        Ok(operation_id)
    }
}
