use super::*;
use crate::coord::TileCoord;
use crate::store::{JobStore, SqliteJobStore, TableKind};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Arc;
use tempfile::TempDir;

const ALWAYS: u32 = u32::MAX;

/// Scripted collaborator state: how many times each key still fails, and
/// every call seen.
#[derive(Default)]
struct Script {
    failures: RefCell<HashMap<String, u32>>,
    calls: RefCell<Vec<String>>,
}

impl Script {
    fn fail(&self, key: impl Into<String>, times: u32) {
        self.failures.borrow_mut().insert(key.into(), times);
    }

    fn call(&self, key: &str) -> Result<(), CollaboratorError> {
        self.calls.borrow_mut().push(key.to_string());
        let mut failures = self.failures.borrow_mut();
        match failures.get_mut(key) {
            Some(0) | None => Ok(()),
            Some(remaining) => {
                if *remaining != ALWAYS {
                    *remaining -= 1;
                }
                Err(CollaboratorError::Other(format!("scripted failure for {}", key)))
            }
        }
    }

    fn calls_for(&self, key: &str) -> usize {
        self.calls.borrow().iter().filter(|k| *k == key).count()
    }

    fn total_calls(&self) -> usize {
        self.calls.borrow().len()
    }
}

#[derive(Clone, Default)]
struct MockUploader {
    script: Rc<Script>,
}

impl TileUploader for MockUploader {
    fn upload(&self, tile: TileCoord) -> Result<String, CollaboratorError> {
        self.script.call(&tile.key())?;
        let n = self.script.calls_for(&tile.key());
        Ok(format!("op-{}-{}", tile, n))
    }
}

/// Fails per tile key, which it reads back out of the handle.
#[derive(Clone, Default)]
struct MockPoller {
    script: Rc<Script>,
}

impl OperationPoller for MockPoller {
    fn get_operation(&self, handle: &str) -> Result<String, CollaboratorError> {
        let key = handle
            .strip_prefix("op-")
            .and_then(|rest| rest.rsplit_once('-'))
            .map(|(key, _)| key.to_string())
            .unwrap_or_else(|| handle.to_string());
        self.script.call(&key)?;
        Ok(format!("rbxassetid://{}", key.replace('_', "")))
    }
}

struct Fixture {
    _dir: TempDir,
    store: SqliteJobStore,
    uploads: Rc<Script>,
    polls: Rc<Script>,
    handler: AssetHandler<SqliteJobStore>,
}

fn fixture() -> Fixture {
    let dir = TempDir::new().unwrap();
    let store = SqliteJobStore::new(dir.path().join("tiles.db"));
    let uploader = MockUploader::default();
    let poller = MockPoller::default();
    let uploads = uploader.script.clone();
    let polls = poller.script.clone();
    let handler = AssetHandler::new(
        store.clone(),
        AssetTables::IMAGERY,
        Box::new(uploader),
        Arc::new(poller),
    );
    Fixture {
        _dir: dir,
        store,
        uploads,
        polls,
        handler,
    }
}

fn missed_keys(store: &SqliteJobStore) -> Vec<String> {
    store
        .list_all(TableKind::MissedImg)
        .unwrap()
        .into_iter()
        .map(|r| r.tile.key())
        .collect()
}

// =============================================================================
// submit
// =============================================================================

#[test]
fn test_submit_records_operation_handle() {
    let f = fixture();
    let tile = TileCoord::new(5, 5, 10);

    let handle = f.handler.submit(tile).unwrap();

    assert_eq!(handle.as_deref(), Some("op-5_5_10-1"));
    assert_eq!(
        f.store.get(TableKind::ImgOperations, tile).unwrap().as_deref(),
        Some("op-5_5_10-1")
    );
    assert!(!f.store.has(TableKind::MissedImg, tile).unwrap());
}

#[test]
fn test_submit_failure_is_recorded_not_raised() {
    let f = fixture();
    let tile = TileCoord::new(5, 5, 10);
    f.uploads.fail("5_5_10", ALWAYS);

    let handle = f.handler.submit(tile).unwrap();

    assert_eq!(handle, None);
    assert!(!f.store.has(TableKind::ImgOperations, tile).unwrap());
    let error = f.store.get(TableKind::MissedImg, tile).unwrap().unwrap();
    assert!(error.contains("scripted failure for 5_5_10"));
}

#[test]
fn test_submit_twice_keeps_one_row_with_latest_value() {
    let f = fixture();
    let tile = TileCoord::new(5, 5, 10);

    f.handler.submit(tile).unwrap();
    f.handler.submit(tile).unwrap();

    assert_eq!(f.store.count(TableKind::ImgOperations).unwrap(), 1);
    assert_eq!(
        f.store.get(TableKind::ImgOperations, tile).unwrap().as_deref(),
        Some("op-5_5_10-2")
    );
}

#[test]
fn test_submit_uses_category_tables() {
    let dir = TempDir::new().unwrap();
    let store = SqliteJobStore::new(dir.path().join("tiles.db"));
    let handler = AssetHandler::new(
        store.clone(),
        AssetTables::MESH,
        Box::new(MockUploader::default()),
        Arc::new(MockPoller::default()),
    );
    let tile = TileCoord::new(1, 1, 1);

    handler.submit(tile).unwrap();

    assert!(store.has(TableKind::MeshOperations, tile).unwrap());
    assert!(!store.has(TableKind::ImgOperations, tile).unwrap());
}

#[test]
fn test_closure_uploader() {
    let dir = TempDir::new().unwrap();
    let store = SqliteJobStore::new(dir.path().join("tiles.db"));
    let uploader = |tile: TileCoord| -> Result<String, CollaboratorError> {
        Ok(format!("closure-{}", tile))
    };
    let handler = AssetHandler::new(
        store.clone(),
        AssetTables::IMAGERY,
        Box::new(uploader),
        Arc::new(MockPoller::default()),
    );

    let handle = handler.submit(TileCoord::new(2, 3, 4)).unwrap();
    assert_eq!(handle.as_deref(), Some("closure-2_3_4"));
}

// =============================================================================
// resolve / resolve_all
// =============================================================================

#[test]
fn test_resolve_records_asset_reference() {
    let f = fixture();
    let tile = TileCoord::new(6, 6, 10);

    let asset = f.handler.resolve(tile, "op-6_6_10-1").unwrap();

    assert_eq!(asset, "rbxassetid://6610");
    assert_eq!(
        f.store.get(TableKind::ImgAssetIds, tile).unwrap().as_deref(),
        Some("rbxassetid://6610")
    );
}

#[test]
fn test_resolve_failure_is_recorded_and_raised() {
    let f = fixture();
    let tile = TileCoord::new(6, 6, 10);
    f.polls.fail("6_6_10", ALWAYS);

    let err = f.handler.resolve(tile, "op-6_6_10-1").unwrap_err();

    assert!(matches!(err, PipelineError::Collaborator { tile: t, .. } if t == tile));
    assert!(f.store.has(TableKind::MissedImg, tile).unwrap());
    assert!(!f.store.has(TableKind::ImgAssetIds, tile).unwrap());
}

#[test]
fn test_resolve_all_skips_resolved_tiles() {
    let f = fixture();
    for tile in [TileCoord::new(0, 0, 1), TileCoord::new(1, 0, 1)] {
        f.store.upsert(TableKind::ImgOperations, tile, "op-x-1").unwrap();
        f.store.upsert(TableKind::ImgAssetIds, tile, "rbxassetid://1").unwrap();
    }

    let summary = f.handler.resolve_all().unwrap();

    assert_eq!(f.polls.total_calls(), 0);
    assert_eq!(
        summary,
        ResolveSummary {
            resolved: 0,
            already_resolved: 2,
            failed: 0
        }
    );
}

#[test]
fn test_resolve_all_continues_past_failures() {
    let f = fixture();
    let bad = TileCoord::new(5, 5, 10);
    let good = TileCoord::new(6, 6, 10);
    f.handler.submit(bad).unwrap();
    f.handler.submit(good).unwrap();
    f.polls.fail("5_5_10", ALWAYS);

    let summary = f.handler.resolve_all().unwrap();

    assert_eq!(summary.resolved, 1);
    assert_eq!(summary.failed, 1);
    assert!(f.store.has(TableKind::ImgAssetIds, good).unwrap());
    assert_eq!(missed_keys(&f.store), vec!["5_5_10"]);
}

// =============================================================================
// reconcile
// =============================================================================

#[test]
fn test_reconcile_empty_missed_table_contacts_nobody() {
    let f = fixture();

    let outcome = f.handler.reconcile().unwrap();

    assert_eq!(outcome, ReconcileOutcome::default());
    assert_eq!(f.uploads.total_calls(), 0);
    assert_eq!(f.polls.total_calls(), 0);
}

#[test]
fn test_reconcile_recovers_on_first_attempt() {
    let f = fixture();
    let tile = TileCoord::new(3, 4, 5);
    f.store.upsert(TableKind::MissedImg, tile, "old error").unwrap();

    let outcome = f.handler.reconcile().unwrap();

    assert_eq!(
        outcome,
        ReconcileOutcome {
            attempts: 1,
            recovered: 1
        }
    );
    assert!(missed_keys(&f.store).is_empty());
    assert!(f.store.has(TableKind::ImgAssetIds, tile).unwrap());
}

#[test]
fn test_reconcile_exhaustion_keeps_only_failing_tiles() {
    let f = fixture();
    let stuck = TileCoord::new(5, 5, 10);
    let flaky = TileCoord::new(6, 6, 10);
    f.store.upsert(TableKind::MissedImg, stuck, "upload failed").unwrap();
    f.store.upsert(TableKind::MissedImg, flaky, "upload failed").unwrap();
    f.uploads.fail("5_5_10", ALWAYS);
    f.uploads.fail("6_6_10", 1);

    let err = f.handler.reconcile().unwrap_err();

    match &err {
        PipelineError::ReconciliationExhausted { attempts, tiles } => {
            assert_eq!(*attempts, MAX_RECONCILE_ATTEMPTS);
            assert_eq!(tiles, &vec![stuck]);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(err.failed_keys(), vec!["5_5_10"]);
    assert!(err.to_string().contains("5_5_10"));

    assert_eq!(missed_keys(&f.store), vec!["5_5_10"]);
    assert_eq!(f.uploads.calls_for("5_5_10"), MAX_RECONCILE_ATTEMPTS as usize);
    // Recovered on attempt 2 and never retried again
    assert_eq!(f.uploads.calls_for("6_6_10"), 2);
    assert!(f.store.has(TableKind::ImgAssetIds, flaky).unwrap());
}

#[test]
fn test_reconcile_retries_resolve_failures_from_submit() {
    let f = fixture();
    let tile = TileCoord::new(7, 7, 10);
    f.store.upsert(TableKind::MissedImg, tile, "poll failed").unwrap();
    f.polls.fail("7_7_10", 2);

    let outcome = f.handler.reconcile().unwrap();

    assert_eq!(outcome.attempts, 3);
    assert_eq!(f.uploads.calls_for("7_7_10"), 3);
    assert_eq!(f.polls.calls_for("7_7_10"), 3);
    assert_eq!(
        f.store.get(TableKind::ImgOperations, tile).unwrap().as_deref(),
        Some("op-7_7_10-3")
    );
    assert!(missed_keys(&f.store).is_empty());
}

#[test]
fn test_reconcile_error_text_tracks_latest_failure() {
    let f = fixture();
    let tile = TileCoord::new(5, 5, 10);
    f.store.upsert(TableKind::MissedImg, tile, "stale").unwrap();
    f.polls.fail("5_5_10", ALWAYS);

    assert!(f.handler.reconcile().is_err());

    let error = f.store.get(TableKind::MissedImg, tile).unwrap().unwrap();
    assert!(error.contains("scripted failure"));
}

#[test]
fn test_asset_display_name() {
    assert_eq!(asset_display_name(TileCoord::new(12, 34, 7)), "TILE_12_34_7");
}
