//! Checkpoint storage trait
//!
//! This module defines the CheckpointStore trait for backend-agnostic
//! checkpoint storage operations.

use anyhow::Result;
use async_trait::async_trait;

/// Trait for checkpoint storage operations.
///
/// A store holds exactly one serialized checkpoint. This trait abstracts the
/// storage backend, allowing the same checkpoint logic to work with:
/// - Filesystem storage (`FilesystemStore`)
/// - In-memory storage (`MemoryStore`)
#[async_trait]
pub trait CheckpointStore: Send + Sync {
    /// Replace the stored checkpoint.
    ///
    /// Implementations must never leave a partially written value behind:
    /// after a crash the store holds either the previous value or `checkpoint_data`.
    async fn store_checkpoint(&self, checkpoint_data: &str) -> Result<()>;

    /// Read the stored checkpoint.
    ///
    /// Returns None if no checkpoint has been stored yet.
    async fn read_checkpoint(&self) -> Result<Option<String>>;

    /// Human readable location, used in log messages.
    fn describe(&self) -> String;
}
