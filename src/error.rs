//! Pipeline error taxonomy.

use std::fmt;

use audit_types::Position;
use splunk_sink::SinkError;
use zabbix_audit_source::SourceError;

/// Step of a run at which an error surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Load,
    Read,
    Deliver,
    Persist,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Load => "load",
            Stage::Read => "read",
            Stage::Deliver => "deliver",
            Stage::Persist => "persist",
        };
        f.write_str(name)
    }
}

/// Fatal outcome of a pipeline run.
///
/// A checkpoint that could not be loaded is not an error: the run starts
/// from the beginning and [`crate::RunReport::checkpoint_recovered`] is set.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Reading from the Zabbix database failed. Nothing was delivered and
    /// the checkpoint is unchanged.
    #[error("[{stage}] source unavailable")]
    SourceUnavailable {
        stage: Stage,
        #[source]
        source: SourceError,
    },

    /// Splunk could not be reached or a send failed. `shipped` records were
    /// delivered before the failure; `checkpoint` is the stored position
    /// after the run.
    #[error("[{stage}] sink unavailable, {shipped} events shipped, checkpoint {checkpoint}")]
    SinkUnavailable {
        stage: Stage,
        shipped: usize,
        checkpoint: Position,
        #[source]
        source: SinkError,
    },

    /// Records were delivered but the new checkpoint could not be stored.
    /// The next run re-delivers them.
    #[error("[{stage}] failed to save checkpoint {position} after shipping {shipped} events")]
    CheckpointSaveFailure {
        stage: Stage,
        position: Position,
        shipped: usize,
        #[source]
        source: anyhow::Error,
    },
}

impl PipelineError {
    pub fn stage(&self) -> Stage {
        match self {
            Self::SourceUnavailable { stage, .. }
            | Self::SinkUnavailable { stage, .. }
            | Self::CheckpointSaveFailure { stage, .. } => *stage,
        }
    }

    /// Number of records that reached the sink before the error.
    pub fn shipped(&self) -> usize {
        match self {
            Self::SourceUnavailable { .. } => 0,
            Self::SinkUnavailable { shipped, .. } | Self::CheckpointSaveFailure { shipped, .. } => {
                *shipped
            }
        }
    }
}
