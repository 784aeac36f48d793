//! Checkpoint management for zabbix-audit-ship
//!
//! Provides storage-agnostic handling of a single resumable position.
//!
//! # Architecture
//!
//! This crate provides a generic checkpoint system that:
//! - Defines the `Checkpoint` trait for the value being persisted
//! - Supports multiple storage backends via the `CheckpointStore` trait
//! - Loads and saves checkpoints via `CheckpointManager`, turning missing or
//!   unreadable storage into a recoverable "start from the beginning" outcome
//!
//! ## Storage Backends
//!
//! - `FilesystemStore` - Stores the checkpoint as a small text file, replaced atomically
//! - `MemoryStore` - Keeps the checkpoint in process memory (tests, dry runs)

mod filesystem;
mod manager;
mod memory;
pub mod store;

#[cfg(test)]
mod tests;

// Re-export manager types
pub use manager::{CheckpointManager, CheckpointOrigin, LoadedCheckpoint};

// Re-export store trait
pub use store::CheckpointStore;

// Re-export storage implementations
pub use filesystem::FilesystemStore;
pub use memory::MemoryStore;

/// Trait that persisted checkpoint values must implement.
///
/// The text produced by `to_cli_string()` is exactly what the store
/// persists, and the same format is accepted on the command line, so an
/// operator can inspect or override a checkpoint by hand.
///
/// `Default` is the checkpoint used when nothing usable is stored.
///
/// # Example
///
/// ```rust
/// use checkpoint::Checkpoint;
///
/// #[derive(Debug, Clone, Default)]
/// pub struct SequenceCheckpoint {
///     pub sequence_id: u64,
/// }
///
/// impl Checkpoint for SequenceCheckpoint {
///     fn to_cli_string(&self) -> String {
///         self.sequence_id.to_string()
///     }
///
///     fn from_cli_string(s: &str) -> anyhow::Result<Self> {
///         Ok(Self {
///             sequence_id: s.trim().parse()?,
///         })
///     }
/// }
/// ```
pub trait Checkpoint: Clone + Default {
    /// Convert to the persisted / CLI-friendly string format.
    ///
    /// The returned string should be parseable by `from_cli_string()`.
    fn to_cli_string(&self) -> String;

    /// Parse from the persisted / CLI string format.
    fn from_cli_string(s: &str) -> anyhow::Result<Self>
    where
        Self: Sized;
}
