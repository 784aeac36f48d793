//! Unit tests for the checkpoint crate.

use tempfile::TempDir;

use crate::{
    Checkpoint, CheckpointManager, CheckpointOrigin, CheckpointStore, FilesystemStore,
    MemoryStore,
};

/// Test checkpoint type for unit tests.
#[derive(Clone, Debug, Default, PartialEq)]
struct TestCheckpoint {
    value: u64,
}

impl Checkpoint for TestCheckpoint {
    fn to_cli_string(&self) -> String {
        self.value.to_string()
    }

    fn from_cli_string(s: &str) -> anyhow::Result<Self> {
        Ok(Self {
            value: s
                .parse()
                .map_err(|e| anyhow::anyhow!("Invalid test checkpoint '{s}': {e}"))?,
        })
    }
}

// ============================================================================
// FilesystemStore Tests
// ============================================================================

#[tokio::test]
async fn test_filesystem_store_missing_file() {
    let tmp = TempDir::new().unwrap();
    let store = FilesystemStore::new(tmp.path().join("checkpoint"));

    assert_eq!(store.read_checkpoint().await.unwrap(), None);
}

#[tokio::test]
async fn test_filesystem_store_replaces_value() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("checkpoint");
    let store = FilesystemStore::new(&path);

    store.store_checkpoint("100").await.unwrap();
    store.store_checkpoint("103").await.unwrap();

    assert_eq!(store.read_checkpoint().await.unwrap().as_deref(), Some("103"));
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "103");
    // The temporary file is renamed away, never left behind
    assert!(!tmp.path().join("checkpoint.tmp").exists());
}

#[tokio::test]
async fn test_filesystem_store_failed_rename_removes_temp_file() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("checkpoint");
    // A non-empty directory in the way makes the final rename fail
    std::fs::create_dir(&path).unwrap();
    std::fs::write(path.join("occupied"), "x").unwrap();
    let store = FilesystemStore::new(&path);

    let err = store.store_checkpoint("103").await.unwrap_err();

    assert!(format!("{err:#}").contains("Failed to move checkpoint into place"));
    assert!(!tmp.path().join("checkpoint.tmp").exists());
    assert!(path.join("occupied").exists());
}

#[tokio::test]
async fn test_filesystem_store_creates_parent_dirs() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("nested").join("state").join("checkpoint");
    let store = FilesystemStore::new(&path);

    store.store_checkpoint("7").await.unwrap();

    assert_eq!(std::fs::read_to_string(&path).unwrap(), "7");
}

#[tokio::test]
async fn test_filesystem_store_unreadable_path_is_error() {
    let tmp = TempDir::new().unwrap();
    // A directory where the file should be cannot be read as a string
    let store = FilesystemStore::new(tmp.path());

    assert!(store.read_checkpoint().await.is_err());
}

// ============================================================================
// CheckpointManager Tests
// ============================================================================

#[tokio::test]
async fn test_load_missing_is_default() {
    let manager: CheckpointManager<_, TestCheckpoint> = CheckpointManager::new(MemoryStore::new());

    let loaded = manager.load().await;

    assert_eq!(loaded.checkpoint, TestCheckpoint::default());
    assert_eq!(loaded.origin, CheckpointOrigin::Missing);
    assert!(!loaded.is_recovered());
}

#[tokio::test]
async fn test_load_stored_value_ignores_trailing_newline() {
    let manager: CheckpointManager<_, TestCheckpoint> =
        CheckpointManager::new(MemoryStore::with_data("100\n"));

    let loaded = manager.load().await;

    assert_eq!(loaded.checkpoint, TestCheckpoint { value: 100 });
    assert_eq!(loaded.origin, CheckpointOrigin::Stored);
}

#[tokio::test]
async fn test_load_corrupt_value_is_recovered() {
    let manager: CheckpointManager<_, TestCheckpoint> =
        CheckpointManager::new(MemoryStore::with_data("garbage"));

    let loaded = manager.load().await;

    assert_eq!(loaded.checkpoint, TestCheckpoint::default());
    assert!(loaded.is_recovered());
    match loaded.origin {
        CheckpointOrigin::Recovered { reason } => assert!(reason.contains("garbage")),
        other => panic!("unexpected origin: {other:?}"),
    }
}

#[tokio::test]
async fn test_load_unreadable_store_is_recovered() {
    let tmp = TempDir::new().unwrap();
    let manager: CheckpointManager<_, TestCheckpoint> =
        CheckpointManager::new(FilesystemStore::new(tmp.path()));

    let loaded = manager.load().await;

    assert_eq!(loaded.checkpoint.value, 0);
    assert!(loaded.is_recovered());
}

#[tokio::test]
async fn test_save_load_roundtrip() {
    let tmp = TempDir::new().unwrap();
    let manager: CheckpointManager<_, TestCheckpoint> =
        CheckpointManager::new(FilesystemStore::new(tmp.path().join("checkpoint")));

    manager.save(&TestCheckpoint { value: 42 }).await.unwrap();

    let loaded = manager.load().await;
    assert_eq!(loaded.checkpoint.value, 42);
    assert_eq!(loaded.origin, CheckpointOrigin::Stored);
}

#[tokio::test]
async fn test_save_failure_keeps_previous_value() {
    let manager: CheckpointManager<_, TestCheckpoint> =
        CheckpointManager::new(MemoryStore::with_data("10"));
    manager.store().fail_writes(true);

    let result = manager.save(&TestCheckpoint { value: 11 }).await;

    assert!(result.is_err());
    assert_eq!(manager.store().data().as_deref(), Some("10"));
}
