//! zabbix-audit-ship library
//!
//! Ships Zabbix audit log entries from the Zabbix MySQL database to a Splunk
//! index, one pass per invocation, resuming from a locally persisted
//! checkpoint.
//!
//! # Features
//!
//! - At-least-once delivery: the checkpoint only moves past records that
//!   reached the index
//! - Partial-delivery safety: a failed send leaves the checkpoint at the last
//!   record delivered before it
//! - Self-provisioning: the audit stored procedure and the destination index
//!   are created when missing
//!
//! # Crates
//!
//! - `audit_types` - positions, checkpoint value, audit records
//! - `checkpoint` - checkpoint stores and manager
//! - `zabbix_audit_source` - reads audit entries from MySQL
//! - `splunk_sink` - renders and delivers events to Splunk
//!
//! # CLI Usage
//!
//! ```bash
//! # Ship everything newer than the stored checkpoint
//! zabbix-audit-ship ship \
//!   --zabbix-uri mysql://zabbix:secret@db:3306/zabbix \
//!   --splunk-url https://splunk:8089 --splunk-user admin --splunk-password changeme \
//!   --index zabbix_audit --host zabbix-prod
//!
//! # Inspect or override the stored checkpoint
//! zabbix-audit-ship checkpoint show
//! zabbix-audit-ship checkpoint set 1200
//! ```

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use splunk_sink::{EventMetadata, SplunkOpts};
use zabbix_audit_source::{mysql_opts_from_parts, mysql_opts_from_url, SourceOpts};

pub mod config;
pub mod error;
pub mod pipeline;

pub use error::{PipelineError, Stage};
pub use pipeline::{Pipeline, RunReport, StartFrom};

use config::{parse_duration, parse_timezone};

/// Zabbix database options
#[derive(Parser, Clone, Debug)]
pub struct ZabbixOpts {
    /// Zabbix MySQL connection URI, e.g. mysql://zabbix:secret@db:3306/zabbix
    #[arg(
        long,
        env = "ZABBIX_DB_URI",
        conflicts_with_all = ["zhost", "zdb", "zuser", "zpass"]
    )]
    pub zabbix_uri: Option<String>,

    /// Zabbix database host
    #[arg(long, env = "ZABBIX_DB_HOST")]
    pub zhost: Option<String>,

    /// Zabbix database port
    #[arg(long, default_value = "3306", env = "ZABBIX_DB_PORT")]
    pub zport: u16,

    /// Zabbix database name
    #[arg(long, env = "ZABBIX_DB_NAME")]
    pub zdb: Option<String>,

    /// Zabbix database user
    #[arg(long, env = "ZABBIX_DB_USER")]
    pub zuser: Option<String>,

    /// Zabbix database password
    #[arg(long, env = "ZABBIX_DB_PASSWORD")]
    pub zpass: Option<String>,

    /// Stored procedure returning audit entries, created if missing
    #[arg(long, default_value = zabbix_audit_source::DEFAULT_PROCEDURE_NAME)]
    pub procedure_name: String,

    /// Timeout for connecting to and querying the database (e.g. "30s", "2m")
    #[arg(long, default_value = "30s", value_parser = parse_duration)]
    pub source_timeout: Duration,
}

impl ZabbixOpts {
    /// Resolve the connection options, preferring the URI when given.
    pub fn to_source_opts(&self) -> anyhow::Result<SourceOpts> {
        let connection = match &self.zabbix_uri {
            Some(uri) => mysql_opts_from_url(uri)?,
            None => {
                let host = self
                    .zhost
                    .as_deref()
                    .context("Either --zabbix-uri or --zhost must be given")?;
                let db = self.zdb.as_deref().context("--zdb is required with --zhost")?;
                let user = self
                    .zuser
                    .as_deref()
                    .context("--zuser is required with --zhost")?;
                mysql_opts_from_parts(
                    host,
                    self.zport,
                    db,
                    user,
                    self.zpass.as_deref().unwrap_or_default(),
                )
            }
        };

        Ok(SourceOpts {
            connection,
            procedure_name: self.procedure_name.clone(),
            timeout: self.source_timeout,
        })
    }
}

/// Splunk options
#[derive(Parser, Clone, Debug)]
pub struct SplunkArgs {
    /// Splunk management endpoint
    #[arg(long, default_value = "https://localhost:8089", env = "SPLUNK_URL")]
    pub splunk_url: String,

    /// Splunk username
    #[arg(long, default_value = "admin", env = "SPLUNK_USERNAME")]
    pub splunk_user: String,

    /// Splunk password
    #[arg(long, env = "SPLUNK_PASSWORD")]
    pub splunk_password: String,

    /// Destination index, created if missing
    #[arg(long, env = "SPLUNK_INDEX")]
    pub index: String,

    /// Host name shown in Splunk for the shipped events
    #[arg(long)]
    pub host: String,

    /// Event sourcetype
    #[arg(long, default_value = "zabbix-audit")]
    pub sourcetype: String,

    /// Event source
    #[arg(long, default_value = "zabbix-db")]
    pub source: String,

    /// Accept invalid TLS certificates on the management endpoint
    #[arg(long)]
    pub splunk_insecure: bool,

    /// Timeout for each Splunk request (e.g. "30s", "2m")
    #[arg(long, default_value = "30s", value_parser = parse_duration)]
    pub sink_timeout: Duration,

    /// Time zone event timestamps are rendered in (e.g. "UTC", "America/Los_Angeles")
    #[arg(long, default_value = "UTC", value_parser = parse_timezone)]
    pub timezone: chrono_tz::Tz,
}

impl From<&SplunkArgs> for SplunkOpts {
    fn from(args: &SplunkArgs) -> Self {
        Self {
            url: args.splunk_url.clone(),
            username: args.splunk_user.clone(),
            password: args.splunk_password.clone(),
            index: args.index.clone(),
            metadata: EventMetadata {
                host: args.host.clone(),
                source: args.source.clone(),
                sourcetype: args.sourcetype.clone(),
            },
            insecure: args.splunk_insecure,
            timeout: args.sink_timeout,
            timezone: args.timezone,
        }
    }
}

/// Checkpoint storage options
#[derive(Parser, Clone, Debug)]
pub struct CheckpointOpts {
    /// File holding the position of the last shipped audit entry
    #[arg(long, default_value = "/tmp/zabbixaudit", env = "ZABBIX_AUDIT_CHECKPOINT", global = true)]
    pub checkpoint_file: PathBuf,
}
