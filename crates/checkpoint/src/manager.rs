//! Generic checkpoint manager.

use std::marker::PhantomData;

use crate::{store::CheckpointStore, Checkpoint};

/// Where a loaded checkpoint came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckpointOrigin {
    /// Parsed from the store.
    Stored,
    /// Nothing stored yet; the default checkpoint is used.
    Missing,
    /// The store could not be read or held garbage; the default checkpoint
    /// is used and `reason` says why.
    Recovered { reason: String },
}

/// Result of [`CheckpointManager::load`].
#[derive(Debug, Clone)]
pub struct LoadedCheckpoint<C> {
    pub checkpoint: C,
    pub origin: CheckpointOrigin,
}

impl<C> LoadedCheckpoint<C> {
    /// Whether the checkpoint had to be reset because storage was unusable.
    pub fn is_recovered(&self) -> bool {
        matches!(self.origin, CheckpointOrigin::Recovered { .. })
    }
}

/// Manager for loading and saving a checkpoint through a `CheckpointStore`.
///
/// # Example
///
/// ```rust,ignore
/// use audit_types::{AuditCheckpoint, Position};
/// use checkpoint::{CheckpointManager, FilesystemStore};
///
/// let manager =
///     CheckpointManager::<_, AuditCheckpoint>::new(FilesystemStore::new("/tmp/zabbixaudit"));
///
/// let loaded = manager.load().await;
/// manager.save(&AuditCheckpoint::new(Position::new(103))).await?;
/// ```
pub struct CheckpointManager<S: CheckpointStore, C: Checkpoint> {
    store: S,
    _checkpoint: PhantomData<fn() -> C>,
}

impl<S: CheckpointStore, C: Checkpoint> CheckpointManager<S, C> {
    /// Create a new manager using the given storage backend.
    pub fn new(store: S) -> Self {
        Self {
            store,
            _checkpoint: PhantomData,
        }
    }

    /// Get a reference to the storage backend.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Load the stored checkpoint.
    ///
    /// This never fails: missing storage yields the default checkpoint, and
    /// unreadable or corrupt storage yields the default checkpoint with a
    /// `Recovered` origin, logged at warn level.
    pub async fn load(&self) -> LoadedCheckpoint<C> {
        let raw = match self.store.read_checkpoint().await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                tracing::info!(
                    "No checkpoint found at {}, starting from the beginning",
                    self.store.describe()
                );
                return LoadedCheckpoint {
                    checkpoint: C::default(),
                    origin: CheckpointOrigin::Missing,
                };
            }
            Err(e) => return Self::recovered(format!("{e:#}"), &self.store),
        };

        match C::from_cli_string(raw.trim()) {
            Ok(checkpoint) => LoadedCheckpoint {
                checkpoint,
                origin: CheckpointOrigin::Stored,
            },
            Err(e) => Self::recovered(format!("{e:#}"), &self.store),
        }
    }

    fn recovered(reason: String, store: &S) -> LoadedCheckpoint<C> {
        tracing::warn!(
            "Can't read checkpoint from {}: {reason}; starting from the beginning",
            store.describe()
        );
        LoadedCheckpoint {
            checkpoint: C::default(),
            origin: CheckpointOrigin::Recovered { reason },
        }
    }

    /// Persist `checkpoint`, replacing any prior value.
    ///
    /// # Errors
    ///
    /// Returns the storage error unchanged; the stored value is then
    /// whatever it was before the call.
    pub async fn save(&self, checkpoint: &C) -> anyhow::Result<()> {
        let data = checkpoint.to_cli_string();
        self.store.store_checkpoint(&data).await?;
        tracing::info!("Saved checkpoint {data} to {}", self.store.describe());
        Ok(())
    }
}
