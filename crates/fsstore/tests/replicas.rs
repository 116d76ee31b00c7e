mod common;

use fsstore::{
    Crypter, FileLog, FsStore, MemoryLog, OpLog, SkipReason, StoreConfig, ValidationError,
};
use serde_json::json;
use std::sync::Arc;

fn manual_refresh() -> StoreConfig {
    StoreConfig {
        refresh_on_write: false,
        ..StoreConfig::default()
    }
}

#[tokio::test]
async fn test_replicas_converge_on_shared_log() {
    let log = MemoryLog::new();
    let a = common::open(Arc::new(log.clone()), None).await;
    let b = common::open(Arc::new(log.clone()), None).await;

    _ = a.mkdir("/r", "from_a").await.unwrap();
    _ = b.mkdir("/r", "from_b").await.unwrap();
    a.update_index().await.unwrap();

    assert_eq!(a.ls("/r"), vec!["/r/from_a", "/r/from_b"]);
    assert_eq!(a.snapshot(), b.snapshot());
}

#[tokio::test]
async fn test_concurrent_conflict_first_entry_wins() {
    let log = MemoryLog::new();
    let a = FsStore::open(Arc::new(log.clone()), None, manual_refresh())
        .await
        .unwrap();
    let b = FsStore::open(Arc::new(log.clone()), None, manual_refresh())
        .await
        .unwrap();

    // Both pass pre-flight against the same stale snapshot.
    _ = a.mkdir("/r", "x").await.unwrap();
    _ = b.mkdir("/r", "x").await.unwrap();
    _ = b.mk("/r/x", "from_b").await.unwrap_err();
    assert!(!a.exists("/r/x"));

    a.update_index().await.unwrap();
    b.update_index().await.unwrap();

    assert_eq!(a.ls("/r"), vec!["/r/x"]);
    assert_eq!(a.snapshot(), b.snapshot());

    let report = a.last_report();
    assert_eq!(report.entries, 2);
    assert_eq!(report.applied, 1);
    assert_eq!(report.skips.len(), 1);
    assert_eq!(report.skips[0].position, 1);
    assert_eq!(
        report.skips[0].reason,
        SkipReason::Precondition(ValidationError::already_exists("/r/x"))
    );
}

#[tokio::test]
async fn test_stale_operation_evaporates_on_replay() {
    let log = MemoryLog::new();
    let a = FsStore::open(Arc::new(log.clone()), None, manual_refresh())
        .await
        .unwrap();
    let b = FsStore::open(Arc::new(log.clone()), None, manual_refresh())
        .await
        .unwrap();

    _ = a.mkdir("/r", "dir").await.unwrap();
    a.update_index().await.unwrap();
    b.update_index().await.unwrap();
    _ = a.mk("/r/dir", "f").await.unwrap();
    a.update_index().await.unwrap();

    // b has not seen the file and removes the directory; a writes the file.
    _ = b.rmdir("/r/dir").await.unwrap();
    _ = a.write("/r/dir/f", json!("late")).await.unwrap();

    a.update_index().await.unwrap();
    b.update_index().await.unwrap();

    assert!(a.tree("/r").is_empty());
    assert_eq!(a.snapshot(), b.snapshot());
    assert_eq!(a.last_report().skipped, 1);
}

#[tokio::test]
async fn test_file_log_reopen_replays_state() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fs.jsonl");
    let crypter: Arc<dyn Crypter> = common::TestCrypter::new(0x21);

    let fingerprint = {
        let log = Arc::new(FileLog::open(&path).await.unwrap());
        let store = common::open(log, Some(crypter.clone())).await;
        _ = store.mkdir("/r", "docs").await.unwrap();
        _ = store.mk("/r/docs", "readme").await.unwrap();
        _ = store
            .write("/r/docs/readme", json!({"title": "hello"}))
            .await
            .unwrap();
        _ = store.cpdir("/r/docs", "/r", "backup").await.unwrap();
        store.snapshot().fingerprint().unwrap()
    };

    let log = Arc::new(FileLog::open(&path).await.unwrap());
    assert_eq!(log.len().await.unwrap(), 4);
    let reopened = common::open(log, Some(crypter)).await;
    assert_eq!(reopened.snapshot().fingerprint().unwrap(), fingerprint);
    assert_eq!(
        reopened.read("/r/backup/readme"),
        Some(json!({"title": "hello"}))
    );
}

#[tokio::test]
async fn test_invariant_checking_config() {
    let config = StoreConfig::from_yaml("verify_invariants: true\nrecord_skips: false\n").unwrap();
    let log = MemoryLog::new();
    let store = FsStore::open(Arc::new(log.clone()), None, config)
        .await
        .unwrap();
    _ = store.mkdir("/r", "a").await.unwrap();

    let other = common::open(Arc::new(log), None).await;
    _ = other.mkdir("/r/a", "b").await.unwrap();
    _ = store.mkdir("/r", "c").await.unwrap();

    assert_eq!(store.tree("/r"), vec!["/r/a", "/r/a/b", "/r/c"]);
    assert!(store.last_report().skips.is_empty());
    assert!(store.snapshot().check_invariants().is_ok());
}
