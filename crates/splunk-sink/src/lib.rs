//! Splunk sink for zabbix-audit-ship.
//!
//! Renders audit records into single-line key/value events and posts them,
//! one event per request, to a Splunk index.
//!
//! - [`traits`] - `SinkConnector` / `AuditSink` / `EventWriter` seams
//! - [`format`] - event line rendering
//! - [`client`] - Splunk management REST client (login, index, receiver)
//! - [`sink`] - `SplunkSink`, which delivers a batch and reports how far it got

pub mod client;
mod error;
pub mod format;
pub mod sink;
pub mod traits;

pub use client::{SimpleReceiver, SplunkClient};
pub use error::SinkError;
pub use format::EventFormatter;
pub use sink::{delivered_watermark, DiscardWriter, DryRunConnector, SplunkConnector, SplunkSink};
pub use traits::{AuditSink, Delivery, EventWriter, SinkConnector};

use std::time::Duration;

/// Metadata attached to every event sent to the index
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EventMetadata {
    /// Host name shown in Splunk for these events
    pub host: String,
    /// Event source, e.g. `zabbix-db`
    pub source: String,
    /// Event sourcetype, e.g. `zabbix-audit`
    pub sourcetype: String,
}

impl EventMetadata {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            source: "zabbix-db".to_string(),
            sourcetype: "zabbix-audit".to_string(),
        }
    }
}

/// Splunk connection options
#[derive(Clone, Debug)]
pub struct SplunkOpts {
    /// Management endpoint, e.g. `https://splunk:8089`
    pub url: String,
    pub username: String,
    pub password: String,
    /// Destination index; created if missing
    pub index: String,
    pub metadata: EventMetadata,
    /// Accept self-signed management certificates
    pub insecure: bool,
    /// Per-request timeout
    pub timeout: Duration,
    /// Time zone event timestamps are rendered in
    pub timezone: chrono_tz::Tz,
}
