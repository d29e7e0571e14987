//! Asset map export.
//!
//! Writes every resolved asset reference of a store as one JSON object keyed
//! by tile:
//!
//! ```json
//! {
//!   "3_4_5": { "img": "rbxassetid://1", "mesh": "rbxassetid://2", "mesh_vert": "0.5_1.5_2" }
//! }
//! ```

use crate::store::{JobStore, SqliteJobStore, StoreError, TableKind};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

/// Export errors.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode asset map: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Asset references known for one tile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TileAssets {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub img: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mesh: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mesh_vert: Option<String>,
}

/// Collects the asset map of `store`, ordered by tile key.
pub fn collect_assets<S: JobStore>(store: &S) -> Result<BTreeMap<String, TileAssets>, StoreError> {
    let mut assets: BTreeMap<String, TileAssets> = BTreeMap::new();

    for record in store.list_all(TableKind::ImgAssetIds)? {
        assets.entry(record.tile.key()).or_default().img = Some(record.value);
    }
    for record in store.list_all(TableKind::MeshAssetIds)? {
        assets.entry(record.tile.key()).or_default().mesh = Some(record.value);
    }
    for record in store.list_all(TableKind::MeshVertOffsets)? {
        assets.entry(record.tile.key()).or_default().mesh_vert = Some(record.value);
    }

    Ok(assets)
}

/// Writes the asset map of the database at `db_path` to `output`.
///
/// Returns the number of tiles written, or `None` if there is no database.
pub fn export_assets_json(db_path: &Path, output: &Path) -> Result<Option<usize>, ExportError> {
    let Some(store) = SqliteJobStore::open_existing(db_path) else {
        warn!("No database found to export assets from: {}", db_path.display());
        return Ok(None);
    };

    let assets = collect_assets(&store)?;
    let json = serde_json::to_string_pretty(&assets)?;
    std::fs::write(output, json).map_err(|source| ExportError::Write {
        path: output.display().to_string(),
        source,
    })?;

    info!(entries = assets.len(), "Exported asset map to {}", output.display());
    Ok(Some(assets.len()))
}
