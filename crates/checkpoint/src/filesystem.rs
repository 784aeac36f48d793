//! Filesystem-based checkpoint storage implementation.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::store::CheckpointStore;

/// Filesystem implementation of CheckpointStore trait.
///
/// Stores the checkpoint as the bare text of a single file. Writes go to a
/// sibling temporary file that is synced and then renamed over the target.
pub struct FilesystemStore {
    path: PathBuf,
}

impl FilesystemStore {
    /// Create a new FilesystemStore backed by the given file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Get the checkpoint file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "checkpoint".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    /// Write `data` to `temp_path`, sync it and rename it over the target.
    fn replace_with(&self, temp_path: &Path, data: &str) -> Result<()> {
        {
            let mut file = File::create(temp_path).with_context(|| {
                format!("Failed to create temporary checkpoint {}", temp_path.display())
            })?;
            file.write_all(data.as_bytes())
                .and_then(|()| file.sync_all())
                .with_context(|| {
                    format!("Failed to write temporary checkpoint {}", temp_path.display())
                })?;
        }

        fs::rename(temp_path, &self.path).with_context(|| {
            format!(
                "Failed to move checkpoint into place at {}",
                self.path.display()
            )
        })?;

        self.sync_parent();
        Ok(())
    }

    /// Persist the rename itself. Best effort: the new value is already in
    /// place, so a failure here is only logged.
    #[cfg(unix)]
    fn sync_parent(&self) {
        let parent = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        if let Err(e) = File::open(parent).and_then(|dir| dir.sync_all()) {
            tracing::warn!(
                "Failed to sync checkpoint directory {}: {e}",
                parent.display()
            );
        }
    }

    #[cfg(not(unix))]
    fn sync_parent(&self) {}
}

#[async_trait]
impl CheckpointStore for FilesystemStore {
    async fn store_checkpoint(&self, checkpoint_data: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create checkpoint directory {}", parent.display())
                })?;
            }
        }

        let temp_path = self.temp_path();
        if let Err(e) = self.replace_with(&temp_path, checkpoint_data) {
            // Never leave a stale temporary next to the checkpoint
            if let Err(cleanup) = fs::remove_file(&temp_path) {
                if cleanup.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!(
                        "Failed to remove temporary checkpoint {}: {cleanup}",
                        temp_path.display()
                    );
                }
            }
            return Err(e);
        }

        tracing::debug!("Stored checkpoint to {}", self.path.display());
        Ok(())
    }

    async fn read_checkpoint(&self) -> Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| {
                format!("Failed to read checkpoint file {}", self.path.display())
            }),
        }
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
