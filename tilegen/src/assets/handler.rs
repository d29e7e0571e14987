//! Per-category job orchestration.

use super::{CollaboratorError, OperationPoller, PipelineError, TileUploader};
use crate::coord::TileCoord;
use crate::store::{JobStore, StoreError, TableKind};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Number of full passes [`AssetHandler::reconcile`] makes over the missed table.
pub const MAX_RECONCILE_ATTEMPTS: u32 = 5;

/// The tables one asset category writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssetTables {
    /// Name used in log messages.
    pub label: &'static str,
    /// Tile → operation handle.
    pub operations: TableKind,
    /// Tile → resolved asset reference.
    pub asset_ids: TableKind,
    /// Tile → last error text.
    pub missed: TableKind,
}

impl AssetTables {
    pub const IMAGERY: AssetTables = AssetTables {
        label: "img",
        operations: TableKind::ImgOperations,
        asset_ids: TableKind::ImgAssetIds,
        missed: TableKind::MissedImg,
    };

    pub const MESH: AssetTables = AssetTables {
        label: "mesh",
        operations: TableKind::MeshOperations,
        asset_ids: TableKind::MeshAssetIds,
        missed: TableKind::MissedMesh,
    };
}

/// Counts from [`AssetHandler::resolve_all`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveSummary {
    pub resolved: usize,
    pub already_resolved: usize,
    pub failed: usize,
}

/// Result of a reconcile run that emptied the missed table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileOutcome {
    /// Passes made over the missed table (0 if it was already empty).
    pub attempts: u32,
    /// Tiles removed from the missed table.
    pub recovered: usize,
}

/// Drives submit/resolve jobs for one asset category.
///
/// Holds no job state of its own: everything it learns goes to the store.
pub struct AssetHandler<S: JobStore> {
    store: S,
    tables: AssetTables,
    uploader: Box<dyn TileUploader>,
    poller: Arc<dyn OperationPoller>,
}

impl<S: JobStore> AssetHandler<S> {
    pub fn new(
        store: S,
        tables: AssetTables,
        uploader: Box<dyn TileUploader>,
        poller: Arc<dyn OperationPoller>,
    ) -> Self {
        Self {
            store,
            tables,
            uploader,
            poller,
        }
    }

    /// Runs the upload strategy for `tile` and records the operation handle.
    ///
    /// An upload failure is written to the missed table and reported as
    /// `Ok(None)`. Only a store failure is returned as an error.
    pub fn submit(&self, tile: TileCoord) -> Result<Option<String>, StoreError> {
        match self.uploader.upload(tile) {
            Ok(handle) => {
                self.store.upsert(self.tables.operations, tile, &handle)?;
                info!(label = self.tables.label, "Successfully uploaded tile {}", tile);
                Ok(Some(handle))
            }
            Err(e) => {
                self.record_miss(tile, &e)?;
                error!(label = self.tables.label, "Failed to upload tile {}: {}", tile, e);
                Ok(None)
            }
        }
    }

    /// Polls `handle` and records the asset reference for `tile`.
    ///
    /// A poll failure is written to the missed table and returned.
    pub fn resolve(&self, tile: TileCoord, handle: &str) -> Result<String, PipelineError> {
        match self.poller.get_operation(handle) {
            Ok(asset) => {
                self.store.upsert(self.tables.asset_ids, tile, &asset)?;
                info!(
                    label = self.tables.label,
                    "Successfully retrieved asset id for tile {}", tile
                );
                Ok(asset)
            }
            Err(e) => {
                self.record_miss(tile, &e)?;
                error!(
                    label = self.tables.label,
                    "Failed to retrieve asset id for tile {}: {}", tile, e
                );
                Err(PipelineError::Collaborator { tile, source: e })
            }
        }
    }

    /// Resolves every recorded operation that has no asset reference yet.
    ///
    /// A tile that fails to resolve is already in the missed table, so the
    /// sweep logs it and moves on.
    pub fn resolve_all(&self) -> Result<ResolveSummary, StoreError> {
        let mut summary = ResolveSummary::default();

        for record in self.store.list_all(self.tables.operations)? {
            if self.store.has(self.tables.asset_ids, record.tile)? {
                summary.already_resolved += 1;
                continue;
            }

            match self.resolve(record.tile, &record.value) {
                Ok(_) => summary.resolved += 1,
                Err(PipelineError::Store(e)) => return Err(e),
                Err(e) => {
                    debug!(label = self.tables.label, "Resolve sweep skipping: {}", e);
                    summary.failed += 1;
                }
            }
        }

        info!(
            label = self.tables.label,
            resolved = summary.resolved,
            already_resolved = summary.already_resolved,
            failed = summary.failed,
            "Asset id sweep complete"
        );
        Ok(summary)
    }

    /// Retries every tile in the missed table until it is empty, at most
    /// [`MAX_RECONCILE_ATTEMPTS`] times.
    ///
    /// Each retry restarts the tile from submit. Tiles that finish both phases
    /// are removed from the missed table after the pass; tiles still failing
    /// after the last pass are returned in
    /// [`PipelineError::ReconciliationExhausted`] and stay in the table.
    pub fn reconcile(&self) -> Result<ReconcileOutcome, PipelineError> {
        let mut missed = self.missed_tiles()?;
        if missed.is_empty() {
            debug!(label = self.tables.label, "No missed tiles to reprocess");
            return Ok(ReconcileOutcome::default());
        }

        let mut recovered = 0;
        for attempt in 1..=MAX_RECONCILE_ATTEMPTS {
            info!(
                label = self.tables.label,
                attempt,
                pending = missed.len(),
                "Reprocessing missed tiles"
            );

            let mut succeeded = Vec::new();
            for &tile in &missed {
                if self.retry_tile(tile)? {
                    succeeded.push(tile);
                }
            }

            for &tile in &succeeded {
                self.store.delete(self.tables.missed, tile)?;
            }
            recovered += succeeded.len();

            missed = self.missed_tiles()?;
            if missed.is_empty() {
                info!(
                    label = self.tables.label,
                    attempt, recovered, "All missed tiles reprocessed"
                );
                return Ok(ReconcileOutcome {
                    attempts: attempt,
                    recovered,
                });
            }

            warn!(
                label = self.tables.label,
                attempt,
                remaining = missed.len(),
                "Missed tiles remain after attempt"
            );
        }

        Err(PipelineError::ReconciliationExhausted {
            attempts: MAX_RECONCILE_ATTEMPTS,
            tiles: missed,
        })
    }

    /// Submit then resolve from scratch. `Ok(false)` means the tile failed
    /// again and its missed row now holds the new error.
    fn retry_tile(&self, tile: TileCoord) -> Result<bool, StoreError> {
        let Some(handle) = self.submit(tile)? else {
            return Ok(false);
        };

        match self.resolve(tile, &handle) {
            Ok(_) => Ok(true),
            Err(PipelineError::Store(e)) => Err(e),
            Err(_) => Ok(false),
        }
    }

    fn missed_tiles(&self) -> Result<Vec<TileCoord>, StoreError> {
        Ok(self
            .store
            .list_all(self.tables.missed)?
            .into_iter()
            .map(|record| record.tile)
            .collect())
    }

    fn record_miss(&self, tile: TileCoord, error: &CollaboratorError) -> Result<(), StoreError> {
        self.store
            .upsert(self.tables.missed, tile, &error.to_string())
    }
}
