//! Collaborator seams of the pipeline.

use super::CollaboratorError;
use crate::coord::TileCoord;

/// Provider-specific work for one tile, ending in a remote create request.
///
/// Returns the handle of the in-flight remote operation.
pub trait TileUploader {
    fn upload(&self, tile: TileCoord) -> Result<String, CollaboratorError>;
}

impl<F> TileUploader for F
where
    F: Fn(TileCoord) -> Result<String, CollaboratorError>,
{
    fn upload(&self, tile: TileCoord) -> Result<String, CollaboratorError> {
        self(tile)
    }
}

/// Exchanges an operation handle for the final asset reference.
///
/// Blocks until the remote operation is done or has failed.
pub trait OperationPoller {
    fn get_operation(&self, handle: &str) -> Result<String, CollaboratorError>;
}
