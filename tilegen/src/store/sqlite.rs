//! SQLite-backed [`JobStore`].

use super::{JobStore, StoreError, TableKind, TileRecord};
use crate::coord::TileCoord;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};

/// Job store backed by a single SQLite database file.
///
/// Holds only the path; each operation opens its own connection and makes
/// sure every table exists before touching it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqliteJobStore {
    path: PathBuf,
}

impl SqliteJobStore {
    /// Creates a store for `path`. The file is created on first use.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Opens an existing database, returning `None` when the file is absent.
    ///
    /// Used for prior-run stores, which must never be created implicitly.
    pub fn open_existing(path: impl AsRef<Path>) -> Option<Self> {
        let path = path.as_ref();
        path.is_file().then(|| Self::new(path))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Creates the database file and all tables.
    pub fn initialize(&self) -> Result<(), StoreError> {
        self.connect().map(|_| ())
    }

    fn connect(&self) -> Result<Connection, StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(StoreError::Directory)?;
        }

        let conn = Connection::open(&self.path)?;
        for table in TableKind::ALL {
            conn.execute_batch(&format!(
                "CREATE TABLE IF NOT EXISTS {} (
                    x INTEGER,
                    y INTEGER,
                    z INTEGER,
                    value TEXT,
                    PRIMARY KEY (x, y, z)
                )",
                table.table_name()
            ))?;
        }
        Ok(conn)
    }
}

fn to_coord(table: TableKind, x: i64, y: i64, z: i64) -> Result<TileCoord, StoreError> {
    match (u32::try_from(x), u32::try_from(y), u8::try_from(z)) {
        (Ok(x), Ok(y), Ok(z)) => Ok(TileCoord::new(x, y, z)),
        _ => Err(StoreError::InvalidCoordinate {
            table: table.table_name(),
            x,
            y,
            z,
        }),
    }
}

impl JobStore for SqliteJobStore {
    fn upsert(&self, table: TableKind, tile: TileCoord, value: &str) -> Result<(), StoreError> {
        let conn = self.connect()?;
        conn.execute(
            &format!(
                "INSERT INTO {} (x, y, z, value)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(x, y, z) DO UPDATE SET value = excluded.value",
                table.table_name()
            ),
            params![tile.x, tile.y, tile.zoom, value],
        )?;
        Ok(())
    }

    fn get(&self, table: TableKind, tile: TileCoord) -> Result<Option<String>, StoreError> {
        let conn = self.connect()?;
        let value = conn
            .query_row(
                &format!(
                    "SELECT value FROM {} WHERE x = ?1 AND y = ?2 AND z = ?3",
                    table.table_name()
                ),
                params![tile.x, tile.y, tile.zoom],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn delete(&self, table: TableKind, tile: TileCoord) -> Result<(), StoreError> {
        let conn = self.connect()?;
        conn.execute(
            &format!(
                "DELETE FROM {} WHERE x = ?1 AND y = ?2 AND z = ?3",
                table.table_name()
            ),
            params![tile.x, tile.y, tile.zoom],
        )?;
        Ok(())
    }

    fn list_all(&self, table: TableKind) -> Result<Vec<TileRecord>, StoreError> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT x, y, z, value FROM {} ORDER BY z, x, y",
            table.table_name()
        ))?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, i64>(2)?,
                row.get::<_, Option<String>>(3)?,
            ))
        })?;

        let mut records = Vec::new();
        for row in rows {
            let (x, y, z, value) = row?;
            records.push(TileRecord {
                tile: to_coord(table, x, y, z)?,
                value: value.unwrap_or_default(),
            });
        }
        Ok(records)
    }

    fn has(&self, table: TableKind, tile: TileCoord) -> Result<bool, StoreError> {
        let conn = self.connect()?;
        let found = conn
            .query_row(
                &format!(
                    "SELECT 1 FROM {} WHERE x = ?1 AND y = ?2 AND z = ?3 LIMIT 1",
                    table.table_name()
                ),
                params![tile.x, tile.y, tile.zoom],
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }

    fn count(&self, table: TableKind) -> Result<usize, StoreError> {
        let conn = self.connect()?;
        let count: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", table.table_name()),
            [],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn temp_store() -> (TempDir, SqliteJobStore) {
        let dir = TempDir::new().unwrap();
        let store = SqliteJobStore::new(dir.path().join("tiles.db"));
        (dir, store)
    }

    #[test]
    fn test_initialize_creates_all_tables() {
        let (_dir, store) = temp_store();
        store.initialize().unwrap();

        assert!(store.path().is_file());
        for table in TableKind::ALL {
            assert_eq!(store.count(table).unwrap(), 0, "{}", table);
        }
    }

    #[test]
    fn test_creates_missing_parent_directory() {
        let dir = TempDir::new().unwrap();
        let store = SqliteJobStore::new(dir.path().join("run").join("nested").join("tiles.db"));
        store
            .upsert(TableKind::ImgOperations, TileCoord::new(1, 2, 3), "op")
            .unwrap();
        assert!(store.path().is_file());
    }

    #[test]
    fn test_upsert_overwrites_value() {
        let (_dir, store) = temp_store();
        let tile = TileCoord::new(5, 5, 10);

        store.upsert(TableKind::ImgOperations, tile, "first").unwrap();
        store.upsert(TableKind::ImgOperations, tile, "second").unwrap();

        assert_eq!(store.count(TableKind::ImgOperations).unwrap(), 1);
        assert_eq!(
            store.get(TableKind::ImgOperations, tile).unwrap().as_deref(),
            Some("second")
        );
    }

    #[test]
    fn test_tables_are_independent() {
        let (_dir, store) = temp_store();
        let tile = TileCoord::new(5, 5, 10);

        store.upsert(TableKind::ImgOperations, tile, "op").unwrap();
        store.upsert(TableKind::MissedImg, tile, "boom").unwrap();

        assert!(store.has(TableKind::ImgOperations, tile).unwrap());
        assert!(store.has(TableKind::MissedImg, tile).unwrap());
        assert!(!store.has(TableKind::MissedMesh, tile).unwrap());
        assert_eq!(store.get(TableKind::ImgAssetIds, tile).unwrap(), None);
    }

    #[test]
    fn test_delete_removes_only_that_row() {
        let (_dir, store) = temp_store();
        let a = TileCoord::new(5, 5, 10);
        let b = TileCoord::new(6, 6, 10);

        store.upsert(TableKind::MissedMesh, a, "err a").unwrap();
        store.upsert(TableKind::MissedMesh, b, "err b").unwrap();
        store.delete(TableKind::MissedMesh, a).unwrap();
        store.delete(TableKind::MissedMesh, a).unwrap();

        let rows = store.list_all(TableKind::MissedMesh).unwrap();
        assert_eq!(
            rows,
            vec![TileRecord {
                tile: b,
                value: "err b".to_string()
            }]
        );
    }

    #[test]
    fn test_list_all_orders_by_zoom_then_position() {
        let (_dir, store) = temp_store();
        let tiles = [
            TileCoord::new(3, 1, 2),
            TileCoord::new(0, 0, 0),
            TileCoord::new(1, 0, 1),
            TileCoord::new(0, 1, 1),
        ];
        for tile in tiles {
            store.upsert(TableKind::ImgAssetIds, tile, &tile.key()).unwrap();
        }

        let listed: Vec<TileCoord> = store
            .list_all(TableKind::ImgAssetIds)
            .unwrap()
            .into_iter()
            .map(|r| r.tile)
            .collect();
        assert_eq!(
            listed,
            vec![
                TileCoord::new(0, 0, 0),
                TileCoord::new(0, 1, 1),
                TileCoord::new(1, 0, 1),
                TileCoord::new(3, 1, 2),
            ]
        );
    }

    #[test]
    fn test_data_survives_reopen() {
        let (dir, store) = temp_store();
        let tile = TileCoord::new(9, 8, 7);
        store.upsert(TableKind::MeshVertOffsets, tile, "0.0_1.5_2.0").unwrap();
        drop(store);

        let reopened = SqliteJobStore::open_existing(dir.path().join("tiles.db")).unwrap();
        assert_eq!(
            reopened.get(TableKind::MeshVertOffsets, tile).unwrap().as_deref(),
            Some("0.0_1.5_2.0")
        );
    }

    #[test]
    fn test_open_existing_does_not_create_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing.db");
        assert!(SqliteJobStore::open_existing(&path).is_none());
        assert!(!path.exists());
    }
}
