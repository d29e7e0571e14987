//! Two-phase asset job pipeline.
//!
//! Each tile goes through *submit* (upload strategy → operation handle) and
//! *resolve* (operation poller → asset reference). Every outcome is written to
//! the [`JobStore`](crate::store::JobStore) so a run can be resumed, and
//! failures collected in the missed table are retried by
//! [`AssetHandler::reconcile`].
//!
//! Imagery and meshes use independent [`AssetHandler`] instances, each with
//! its own [`AssetTables`].

mod error;
mod handler;
mod traits;

pub use error::{CollaboratorError, PipelineError};
pub use handler::{
    AssetHandler, AssetTables, ReconcileOutcome, ResolveSummary, MAX_RECONCILE_ATTEMPTS,
};
pub use traits::{OperationPoller, TileUploader};

use crate::coord::TileCoord;

/// Display name given to the remote asset created for `tile`.
pub fn asset_display_name(tile: TileCoord) -> String {
    format!("TILE_{}", tile.key())
}

#[cfg(test)]
mod tests;
