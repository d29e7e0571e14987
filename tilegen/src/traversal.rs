//! Quadtree traversal and per-category processing.
//!
//! The driver walks a built tree depth first and dispatches tiles to an
//! [`AssetHandler`]. A prior run's store can be supplied so tiles it already
//! finished are skipped.

use crate::assets::{
    AssetHandler, AssetTables, PipelineError, ReconcileOutcome, ResolveSummary,
};
use crate::coord::TileCoord;
use crate::quadtree::Tile;
use crate::store::{JobStore, StoreError, TableKind};
use std::fmt;
use tracing::{debug, error, info, warn};

/// Asset categories produced per tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetCategory {
    Imagery,
    Mesh,
}

impl AssetCategory {
    pub const ALL: [AssetCategory; 2] = [AssetCategory::Imagery, AssetCategory::Mesh];

    pub fn tables(&self) -> AssetTables {
        match self {
            AssetCategory::Imagery => AssetTables::IMAGERY,
            AssetCategory::Mesh => AssetTables::MESH,
        }
    }

    /// Short name used on the command line and in logs.
    pub fn label(&self) -> &'static str {
        self.tables().label
    }

    /// Tables that must all hold a row for a tile to count as finished.
    pub fn completion_tables(&self) -> &'static [TableKind] {
        match self {
            AssetCategory::Imagery => &[TableKind::ImgAssetIds],
            AssetCategory::Mesh => &[TableKind::MeshAssetIds, TableKind::MeshVertOffsets],
        }
    }
}

impl fmt::Display for AssetCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Tiles dispatched and skipped during one walk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TraversalStats {
    pub processed: usize,
    pub skipped: usize,
}

impl TraversalStats {
    pub fn total(&self) -> usize {
        self.processed + self.skipped
    }
}

impl std::ops::AddAssign for TraversalStats {
    fn add_assign(&mut self, other: Self) {
        self.processed += other.processed;
        self.skipped += other.skipped;
    }
}

/// How the reconcile phase of a category ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileStatus {
    Complete(ReconcileOutcome),
    /// Retries ran out; these tiles are still in the missed table.
    Exhausted { attempts: u32, tiles: Vec<TileCoord> },
}

/// Everything [`TraversalDriver::process_category`] did for one category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryReport {
    pub category: AssetCategory,
    pub stats: TraversalStats,
    pub resolve: ResolveSummary,
    pub reconcile: ReconcileStatus,
}

impl CategoryReport {
    pub fn is_reconciled(&self) -> bool {
        matches!(self.reconcile, ReconcileStatus::Complete(_))
    }
}

/// Walks the tree and feeds tiles to a handler.
pub struct TraversalDriver<P: JobStore> {
    prior: Option<P>,
    process_all_nodes: bool,
}

impl<P: JobStore> TraversalDriver<P> {
    /// `prior` is the store of an earlier run, consulted read-only.
    pub fn new(prior: Option<P>, process_all_nodes: bool) -> Self {
        Self {
            prior,
            process_all_nodes,
        }
    }

    /// Whether the prior store already holds a finished `category` asset for
    /// `tile`. Without a prior store nothing is finished.
    ///
    /// A failing lookup counts as not finished.
    pub fn tile_already_done(&self, tile: TileCoord, category: AssetCategory) -> bool {
        let Some(prior) = &self.prior else {
            return false;
        };

        for &table in category.completion_tables() {
            match prior.has(table, tile) {
                Ok(true) => {}
                Ok(false) => return false,
                Err(e) => {
                    warn!("Error checking tile existence for {} in {}: {}", tile, table, e);
                    return false;
                }
            }
        }
        true
    }

    /// Visits `root` and every descendant in pre-order, submitting the tiles
    /// that should be processed.
    ///
    /// Children are always visited, whether or not their parent was
    /// processed or skipped.
    pub fn walk<S: JobStore>(
        &self,
        root: &Tile,
        category: AssetCategory,
        handler: &AssetHandler<S>,
        stats: &mut TraversalStats,
    ) -> Result<(), StoreError> {
        for tile in root.iter() {
            if !(tile.is_leaf() || self.process_all_nodes) {
                continue;
            }

            let coord = tile.coord();
            if self.tile_already_done(coord, category) {
                debug!(label = category.label(), "Skipping tile {}: already exists", coord);
                stats.skipped += 1;
                continue;
            }

            if self.prior.is_some() {
                debug!(label = category.label(), "Processing tile {}: not in existing store", coord);
            }
            handler.submit(coord)?;
            stats.processed += 1;
        }
        Ok(())
    }

    /// Walks the tree, then resolves and reconciles the category.
    ///
    /// Exhausted reconciliation is logged and reported, not returned, so the
    /// caller can move on to the next category. Store failures are returned.
    pub fn process_category<S: JobStore>(
        &self,
        root: &Tile,
        category: AssetCategory,
        handler: &AssetHandler<S>,
    ) -> Result<CategoryReport, PipelineError> {
        info!(label = category.label(), "Processing {} tiles", category);

        let mut stats = TraversalStats::default();
        self.walk(root, category, handler, &mut stats)?;
        info!(
            label = category.label(),
            processed = stats.processed,
            skipped = stats.skipped,
            "Tile walk complete"
        );

        let resolve = handler.resolve_all()?;

        let reconcile = match handler.reconcile() {
            Ok(outcome) => ReconcileStatus::Complete(outcome),
            Err(PipelineError::ReconciliationExhausted { attempts, tiles }) => {
                let keys: Vec<String> = tiles.iter().map(TileCoord::key).collect();
                error!(
                    label = category.label(),
                    attempts,
                    "Failed to reprocess {} tile(s): {}",
                    tiles.len(),
                    keys.join(", ")
                );
                ReconcileStatus::Exhausted { attempts, tiles }
            }
            Err(e) => return Err(e),
        };

        Ok(CategoryReport {
            category,
            stats,
            resolve,
            reconcile,
        })
    }
}
