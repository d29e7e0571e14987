//! Persistent job store.
//!
//! Every job-state category lives in its own table keyed by tile coordinate.
//! All tables share the schema `(x INTEGER, y INTEGER, z INTEGER, value TEXT)`
//! with `(x, y, z)` as primary key, and every write is an upsert.
//!
//! [`SqliteJobStore`] opens a connection per call: a crash between calls
//! leaves the database in a valid, partially-filled state.

mod sqlite;
mod table;

pub use sqlite::SqliteJobStore;
pub use table::TableKind;

use crate::coord::TileCoord;
use thiserror::Error;

/// Store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("failed to create store directory: {0}")]
    Directory(std::io::Error),

    #[error("invalid tile coordinate in {table}: ({x}, {y}, {z})")]
    InvalidCoordinate {
        table: &'static str,
        x: i64,
        y: i64,
        z: i64,
    },
}

/// One row of a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileRecord {
    pub tile: TileCoord,
    pub value: String,
}

/// Tile-keyed tables.
pub trait JobStore {
    /// Inserts or replaces the value stored for `tile`.
    fn upsert(&self, table: TableKind, tile: TileCoord, value: &str) -> Result<(), StoreError>;

    fn get(&self, table: TableKind, tile: TileCoord) -> Result<Option<String>, StoreError>;

    /// Removes the row for `tile`. Deleting an absent row is not an error.
    fn delete(&self, table: TableKind, tile: TileCoord) -> Result<(), StoreError>;

    /// All rows of `table`, ordered by `(z, x, y)`.
    fn list_all(&self, table: TableKind) -> Result<Vec<TileRecord>, StoreError>;

    fn has(&self, table: TableKind, tile: TileCoord) -> Result<bool, StoreError>;

    fn count(&self, table: TableKind) -> Result<usize, StoreError>;
}
