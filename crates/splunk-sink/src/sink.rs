//! Batch delivery to Splunk.

use async_trait::async_trait;
use audit_types::{AuditRecord, Position};
use tracing::info;

use crate::client::{validate_index_name, SimpleReceiver, SplunkClient};
use crate::{
    AuditSink, Delivery, EventFormatter, EventWriter, SinkConnector, SinkError, SplunkOpts,
};

/// Highest position that is safe to checkpoint once the first `delivered`
/// records of `records` have reached the sink.
///
/// That is the largest delivered id lying strictly below every undelivered
/// id. For an ascending batch of unique ids this is the id of the last
/// delivered record. An entry split over several records is never
/// checkpointed while one of its records is still undelivered, and nothing
/// is checkpointed past a gap left by an out of order batch.
pub fn delivered_watermark(records: &[AuditRecord], delivered: usize) -> Option<Position> {
    let delivered = delivered.min(records.len());
    let (sent, unsent) = records.split_at(delivered);
    let floor = unsent.iter().map(|r| r.id).min();

    sent.iter()
        .map(|r| r.id)
        .filter(|id| floor.map_or(true, |floor| *id < floor))
        .max()
}

impl Delivery {
    fn of(records: &[AuditRecord], delivered: usize) -> Self {
        Self {
            delivered,
            watermark: delivered_watermark(records, delivered),
        }
    }
}

/// Sink rendering records with an [`EventFormatter`] and appending them
/// through an [`EventWriter`].
pub struct SplunkSink<W: EventWriter> {
    writer: W,
    formatter: EventFormatter,
    index: String,
}

impl<W: EventWriter> SplunkSink<W> {
    pub fn new(writer: W, formatter: EventFormatter, index: impl Into<String>) -> Self {
        Self {
            writer,
            formatter,
            index: index.into(),
        }
    }

    pub fn index(&self) -> &str {
        &self.index
    }
}

#[async_trait]
impl<W: EventWriter> AuditSink for SplunkSink<W> {
    async fn deliver(&mut self, records: &[AuditRecord]) -> Result<Delivery, SinkError> {
        let mut delivered = 0;

        for record in records {
            let line = self.formatter.render(record);
            // Echo locally whether or not the send below succeeds
            info!("{line}");

            if let Err(error) = self.writer.append_line(&line).await {
                return Err(SinkError::Interrupted {
                    partial: Delivery::of(records, delivered),
                    total: records.len(),
                    error: error.context(format!("Failed to deliver audit entry {}", record.id)),
                });
            }
            delivered += 1;
        }

        info!("{delivered} events were added to splunk index [{}]", self.index);
        Ok(Delivery::of(records, delivered))
    }

    async fn close(self) -> Result<(), SinkError> {
        self.writer
            .close()
            .await
            .map_err(|e| SinkError::unavailable(format!("Failed to detach from index {}", self.index), e))
    }
}

/// Connector logging in to Splunk and attaching to the configured index
#[derive(Clone, Debug)]
pub struct SplunkConnector {
    opts: SplunkOpts,
}

impl SplunkConnector {
    pub fn new(opts: SplunkOpts) -> Self {
        Self { opts }
    }
}

#[async_trait]
impl SinkConnector for SplunkConnector {
    type Sink = SplunkSink<SimpleReceiver>;

    async fn connect(&self) -> Result<Self::Sink, SinkError> {
        let index = &self.opts.index;
        validate_index_name(index).map_err(SinkError::Unavailable)?;

        let client = SplunkClient::login(&self.opts)
            .await
            .map_err(|e| SinkError::unavailable("Failed to connect to Splunk", e))?;
        client
            .ensure_index(index)
            .await
            .map_err(|e| SinkError::unavailable(format!("Failed to attach to index {index}"), e))?;

        info!("Attached to Splunk index [{index}]");
        let receiver = client.attach(index, &self.opts.metadata);
        Ok(SplunkSink::new(
            receiver,
            EventFormatter::new(self.opts.timezone),
            index.clone(),
        ))
    }
}

/// Event writer that accepts and drops every line.
#[derive(Debug, Default)]
pub struct DiscardWriter;

#[async_trait]
impl EventWriter for DiscardWriter {
    async fn append_line(&mut self, _line: &str) -> anyhow::Result<()> {
        Ok(())
    }

    async fn close(self) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Connector for dry runs: records are rendered and logged, nothing is sent
/// and Splunk is never contacted.
#[derive(Clone, Debug)]
pub struct DryRunConnector {
    formatter: EventFormatter,
    index: String,
}

impl DryRunConnector {
    pub fn new(formatter: EventFormatter, index: impl Into<String>) -> Self {
        Self {
            formatter,
            index: index.into(),
        }
    }
}

#[async_trait]
impl SinkConnector for DryRunConnector {
    type Sink = SplunkSink<DiscardWriter>;

    async fn connect(&self) -> Result<Self::Sink, SinkError> {
        Ok(SplunkSink::new(DiscardWriter, self.formatter, self.index.clone()))
    }
}
