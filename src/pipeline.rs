//! Single-pass audit shipping pipeline.
//!
//! One run loads the checkpoint, reads every audit entry newer than it,
//! delivers them in order and persists the position of the last entry that
//! reached the sink:
//!
//! ```text
//! load checkpoint -> read batch -> (empty -> done)
//!                                | (records -> deliver -> persist -> done)
//! ```
//!
//! Nothing is retried within a run. A failed run leaves the checkpoint at or
//! behind the last delivered entry, so re-running resumes safely.

use std::fmt;

use audit_types::{AuditCheckpoint, AuditRecord, Position};
use checkpoint::{CheckpointManager, CheckpointStore};
use splunk_sink::{AuditSink, Delivery, SinkConnector, SinkError};
use tracing::{error, info, warn};
use zabbix_audit_source::{AuditSource, SourceConnector};

use crate::error::{PipelineError, Stage};

/// Where a run starts reading from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartFrom {
    /// The stored checkpoint, or the beginning if none is usable.
    Checkpoint,
    /// An operator-supplied position, ignoring the stored checkpoint.
    Position(Position),
}

/// Summary of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// Position the batch was read from
    pub start: Position,
    /// Number of records delivered
    pub shipped: usize,
    /// Stored checkpoint after the run
    pub checkpoint: Position,
    /// The stored checkpoint was unreadable and the run started from zero
    pub checkpoint_recovered: bool,
    pub dry_run: bool,
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.dry_run {
            write!(
                f,
                "{} events rendered (dry run), checkpoint left at {}",
                self.shipped, self.checkpoint
            )
        } else {
            write!(
                f,
                "{} events shipped, checkpoint at {}",
                self.shipped, self.checkpoint
            )
        }
    }
}

/// Audit shipping pipeline over a checkpoint store, a source and a sink.
pub struct Pipeline<S, SC, KC>
where
    S: CheckpointStore,
    SC: SourceConnector,
    KC: SinkConnector,
{
    checkpoints: CheckpointManager<S, AuditCheckpoint>,
    source: SC,
    sink: KC,
    dry_run: bool,
}

impl<S, SC, KC> Pipeline<S, SC, KC>
where
    S: CheckpointStore,
    SC: SourceConnector,
    KC: SinkConnector,
{
    pub fn new(store: S, source: SC, sink: KC) -> Self {
        Self {
            checkpoints: CheckpointManager::new(store),
            source,
            sink,
            dry_run: false,
        }
    }

    /// In dry-run mode the checkpoint is never saved.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn checkpoints(&self) -> &CheckpointManager<S, AuditCheckpoint> {
        &self.checkpoints
    }

    /// Execute one pass.
    pub async fn run(&self, from: StartFrom) -> Result<RunReport, PipelineError> {
        // The stored value is what gets reported when nothing new is saved,
        // also when the read starts from an operator-supplied position.
        let loaded = self.checkpoints.load().await;
        let stored = loaded.checkpoint.position;
        let (start, checkpoint_recovered) = match from {
            StartFrom::Checkpoint => (stored, loaded.is_recovered()),
            StartFrom::Position(position) => {
                info!("Ignoring stored checkpoint {stored}, starting from position {position}");
                (position, false)
            }
        };

        info!("Reading audit entries newer than {start}");
        let records = self.read_batch(start).await?;

        let report = |shipped, checkpoint| RunReport {
            start,
            shipped,
            checkpoint,
            checkpoint_recovered,
            dry_run: self.dry_run,
        };

        if records.is_empty() {
            info!("No audit entries newer than {start}");
            return Ok(report(0, stored));
        }

        match self.deliver(&records).await {
            Ok(delivery) => {
                let checkpoint = self.persist(start, stored, &delivery).await?;
                Ok(report(delivery.delivered, checkpoint))
            }
            Err(source) => {
                let partial = source.partial().copied().unwrap_or_default();
                let checkpoint = self.persist_partial(start, stored, &partial).await;
                Err(PipelineError::SinkUnavailable {
                    stage: Stage::Deliver,
                    shipped: partial.delivered,
                    checkpoint,
                    source,
                })
            }
        }
    }

    async fn read_batch(&self, start: Position) -> Result<Vec<AuditRecord>, PipelineError> {
        let unavailable = |source| PipelineError::SourceUnavailable {
            stage: Stage::Read,
            source,
        };

        let mut source = self.source.connect().await.map_err(unavailable)?;
        let kind = source.source_type();
        let read = source.read_since(start).await;
        if let Err(e) = source.close().await {
            warn!("Failed to close {kind} source: {e}");
        }

        let records = read.map_err(unavailable)?;
        info!("Read {} audit entries from {kind}", records.len());
        Ok(records)
    }

    async fn deliver(&self, records: &[AuditRecord]) -> Result<Delivery, SinkError> {
        let mut sink = self.sink.connect().await?;
        let delivery = sink.deliver(records).await;
        if let Err(e) = sink.close().await {
            warn!("Failed to close sink: {e}");
        }
        delivery
    }

    /// Store the watermark of a completed delivery and return the stored
    /// checkpoint.
    async fn persist(
        &self,
        start: Position,
        stored: Position,
        delivery: &Delivery,
    ) -> Result<Position, PipelineError> {
        let Some(position) = self.advance(start, delivery) else {
            return Ok(stored);
        };

        self.checkpoints
            .save(&AuditCheckpoint::new(position))
            .await
            .map_err(|source| PipelineError::CheckpointSaveFailure {
                stage: Stage::Persist,
                position,
                shipped: delivery.delivered,
                source,
            })?;
        Ok(position)
    }

    /// Store the watermark of an interrupted delivery. The sink error is what
    /// gets reported, so a save failure here is only logged.
    async fn persist_partial(&self, start: Position, stored: Position, partial: &Delivery) -> Position {
        let Some(position) = self.advance(start, partial) else {
            return stored;
        };

        match self.checkpoints.save(&AuditCheckpoint::new(position)).await {
            Ok(()) => position,
            Err(e) => {
                error!(
                    "Failed to save checkpoint {position} after {} events were shipped: {e:#}",
                    partial.delivered
                );
                stored
            }
        }
    }

    /// New checkpoint for `delivery`, if one should be stored.
    fn advance(&self, start: Position, delivery: &Delivery) -> Option<Position> {
        let position = delivery.watermark.filter(|watermark| *watermark > start)?;
        if self.dry_run {
            info!("Dry run, checkpoint {position} not saved");
            return None;
        }
        Some(position)
    }
}
