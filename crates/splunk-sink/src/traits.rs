//! Sink trait definitions.
//!
//! These traits separate the pipeline from Splunk specifics:
//!
//! - [`SinkConnector`] opens a sink at the start of a run
//! - [`AuditSink`] delivers an ordered batch and reports the outcome
//! - [`EventWriter`] is the line-oriented transport under a sink
//!
//! The pipeline is generic over the connector, so tests can substitute
//! in-memory implementations:
//!
//! ```ignore
//! pub async fn run<K: SinkConnector>(sink: &K, records: &[AuditRecord]) -> Result<()> {
//!     let mut sink = sink.connect().await?;
//!     let delivery = sink.deliver(records).await?;
//!     sink.close().await?;
//! }
//! ```

use async_trait::async_trait;
use audit_types::{AuditRecord, Position};

use crate::SinkError;

/// Outcome of delivering (part of) a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Delivery {
    /// Number of records that reached the sink, counted from the batch start
    pub delivered: usize,
    /// Highest position that is safe to checkpoint, `None` if nothing is
    pub watermark: Option<Position>,
}

/// Opens sinks.
#[async_trait]
pub trait SinkConnector: Send + Sync {
    type Sink: AuditSink;

    /// Resolve (or create) the destination and open the transport.
    async fn connect(&self) -> Result<Self::Sink, SinkError>;
}

/// Delivers audit records.
#[async_trait]
pub trait AuditSink: Send {
    /// Send every record in order, stopping at the first failure.
    ///
    /// On failure the returned error carries the partial [`Delivery`], so the
    /// caller never advances past a record that was not delivered.
    async fn deliver(&mut self, records: &[AuditRecord]) -> Result<Delivery, SinkError>;

    /// Release the transport.
    async fn close(self) -> Result<(), SinkError>;
}

/// Line-oriented event transport.
#[async_trait]
pub trait EventWriter: Send {
    /// Append one event line. `line` carries no terminator.
    async fn append_line(&mut self, line: &str) -> anyhow::Result<()>;

    /// Release the transport.
    async fn close(self) -> anyhow::Result<()>;
}
