//! In-memory checkpoint storage.

use anyhow::Result;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use crate::store::CheckpointStore;

/// CheckpointStore that keeps the checkpoint in process memory.
///
/// Nothing survives the process. Writes can be made to fail on demand so
/// callers can exercise their save-failure handling.
#[derive(Default)]
pub struct MemoryStore {
    data: Mutex<Option<String>>,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that already holds `checkpoint_data`.
    pub fn with_data(checkpoint_data: impl Into<String>) -> Self {
        Self {
            data: Mutex::new(Some(checkpoint_data.into())),
            fail_writes: AtomicBool::new(false),
        }
    }

    /// Make every subsequent `store_checkpoint` call fail.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Snapshot of the stored value.
    pub fn data(&self) -> Option<String> {
        self.data.lock().map(|d| d.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl CheckpointStore for MemoryStore {
    async fn store_checkpoint(&self, checkpoint_data: &str) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            anyhow::bail!("checkpoint store is not writable");
        }
        let mut data = self
            .data
            .lock()
            .map_err(|_| anyhow::anyhow!("checkpoint store lock poisoned"))?;
        *data = Some(checkpoint_data.to_string());
        Ok(())
    }

    async fn read_checkpoint(&self) -> Result<Option<String>> {
        let data = self
            .data
            .lock()
            .map_err(|_| anyhow::anyhow!("checkpoint store lock poisoned"))?;
        Ok(data.clone())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
