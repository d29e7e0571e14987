//! Pipeline error types.

use crate::coord::TileCoord;
use crate::mesh::MeshError;
use crate::opencloud::OpenCloudError;
use crate::provider::ProviderError;
use crate::store::StoreError;
use thiserror::Error;

/// Failure of an upload strategy or the operation poller.
///
/// The pipeline only records its text; the variants exist so collaborators
/// can use `?` on their own error types.
#[derive(Debug, Error)]
pub enum CollaboratorError {
    #[error("{0}")]
    Provider(#[from] ProviderError),

    #[error("{0}")]
    OpenCloud(#[from] OpenCloudError),

    #[error("image processing failed: {0}")]
    Image(#[from] image::ImageError),

    #[error("mesh generation failed: {0}")]
    Mesh(#[from] MeshError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("{0}")]
    Other(String),
}

/// Errors surfaced by [`AssetHandler`](super::AssetHandler).
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A resolve call failed; the failure is already in the missed table.
    #[error("tile {tile} failed: {source}")]
    Collaborator {
        tile: TileCoord,
        #[source]
        source: CollaboratorError,
    },

    /// The job store could not be read or written.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Retries ran out with tiles still in the missed table.
    #[error(
        "failed to reprocess {} tile(s) after {attempts} attempts: {}",
        .tiles.len(),
        keys(.tiles).join(", ")
    )]
    ReconciliationExhausted { attempts: u32, tiles: Vec<TileCoord> },
}

impl PipelineError {
    /// Keys of the still-failing tiles, for `ReconciliationExhausted`.
    pub fn failed_keys(&self) -> Vec<String> {
        match self {
            PipelineError::ReconciliationExhausted { tiles, .. } => keys(tiles),
            _ => Vec::new(),
        }
    }
}

fn keys(tiles: &[TileCoord]) -> Vec<String> {
    tiles.iter().map(TileCoord::key).collect()
}
