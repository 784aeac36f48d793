//! Record positions and the checkpoint that persists them.

use std::str::FromStr;

/// Position of a record in the source's strictly increasing id sequence.
///
/// A position is both a cursor ("everything up to here has been shipped")
/// and the unique identifier of the audit entry it was read from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position(u64);

impl Position {
    /// Start of the sequence; every record is newer than this.
    pub const ZERO: Position = Position(0);

    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn value(self) -> u64 {
        self.0
    }
}

impl From<u64> for Position {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error returned when a position string is not a non-negative integer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid position '{input}': expected a non-negative integer")]
pub struct ParsePositionError {
    input: String,
}

impl FromStr for Position {
    type Err = ParsePositionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u64>()
            .map(Position)
            .map_err(|_| ParsePositionError {
                input: s.to_string(),
            })
    }
}

/// Checkpoint for the audit pipeline: the position of the last record known
/// to have reached the sink.
///
/// The persisted form is the bare decimal position, so the checkpoint file
/// can be inspected and edited by hand.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AuditCheckpoint {
    pub position: Position,
}

impl AuditCheckpoint {
    pub fn new(position: Position) -> Self {
        Self { position }
    }
}

impl checkpoint::Checkpoint for AuditCheckpoint {
    fn to_cli_string(&self) -> String {
        self.position.to_string()
    }

    fn from_cli_string(s: &str) -> anyhow::Result<Self> {
        let position = s
            .parse::<Position>()
            .map_err(|e| anyhow::anyhow!("Invalid audit checkpoint: {e}"))?;
        Ok(Self { position })
    }
}
