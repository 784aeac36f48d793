//! Zabbix audit source backed by MySQL
//!
//! A source is acquired through a [`SourceConnector`] at the start of a run
//! and handed back with [`AuditSource::close`] on every exit path, so the
//! connection lifetime is scoped to the run rather than to the process.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use audit_types::{AuditRecord, Position};
use mysql_async::{prelude::*, Conn, Pool, Row};
use tracing::{debug, info, warn};

use crate::procedure::{ensure_audit_procedure, validate_procedure_name};
use crate::row::decode_row;
use crate::{new_mysql_pool, SourceError, SourceOpts};

/// Opens audit sources.
#[async_trait]
pub trait SourceConnector: Send + Sync {
    type Source: AuditSource;

    /// Connect to the source and provision whatever it needs server side.
    async fn connect(&self) -> Result<Self::Source, SourceError>;
}

/// Reads audit records relative to a position.
#[async_trait]
pub trait AuditSource: Send {
    /// Get the source type identifier
    fn source_type(&self) -> &'static str;

    /// Return every record with `id > since`, in ascending id order.
    ///
    /// An empty batch is a normal outcome. Two calls with the same `since`
    /// against unchanged data return identical batches.
    async fn read_since(&mut self, since: Position) -> Result<Vec<AuditRecord>, SourceError>;

    /// Release the connection.
    async fn close(self) -> Result<(), SourceError>;
}

/// Runs `fut` under `limit`, mapping both failure and expiry to `Unavailable`.
async fn bounded<T, E, F>(limit: Duration, what: &str, fut: F) -> Result<T, SourceError>
where
    F: Future<Output = Result<T, E>>,
    E: Into<anyhow::Error>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(SourceError::unavailable(format!("Failed {what}"), e)),
        Err(elapsed) => Err(SourceError::unavailable(
            format!("Timed out after {limit:?} {what}"),
            elapsed,
        )),
    }
}

/// Connector for the Zabbix MySQL database
#[derive(Clone, Debug)]
pub struct MySQLSourceConnector {
    opts: SourceOpts,
}

impl MySQLSourceConnector {
    pub fn new(opts: SourceOpts) -> Self {
        Self { opts }
    }
}

#[async_trait]
impl SourceConnector for MySQLSourceConnector {
    type Source = MySQLAuditSource;

    async fn connect(&self) -> Result<MySQLAuditSource, SourceError> {
        validate_procedure_name(&self.opts.procedure_name)?;

        let pool = new_mysql_pool(self.opts.connection.clone());

        let limit = self.opts.timeout;
        let prepared = async {
            let mut conn = bounded(limit, "connecting to MySQL", pool.get_conn()).await?;
            bounded(
                limit,
                "provisioning the audit procedure",
                ensure_audit_procedure(&mut conn, &self.opts.procedure_name),
            )
            .await?;
            Ok::<_, SourceError>(conn)
        }
        .await;

        match prepared {
            Ok(conn) => {
                info!("MySQL connection established for audit reads");
                Ok(MySQLAuditSource {
                    pool,
                    connection: Some(conn),
                    procedure_name: self.opts.procedure_name.clone(),
                    timeout: limit,
                })
            }
            Err(e) => {
                if let Err(disconnect_err) = pool.disconnect().await {
                    warn!("Failed to disconnect MySQL pool: {disconnect_err}");
                }
                Err(e)
            }
        }
    }
}

/// Audit source reading through the audit stored procedure
pub struct MySQLAuditSource {
    pool: Pool,
    connection: Option<Conn>,
    procedure_name: String,
    timeout: Duration,
}

#[async_trait]
impl AuditSource for MySQLAuditSource {
    fn source_type(&self) -> &'static str {
        "zabbix-mysql"
    }

    async fn read_since(&mut self, since: Position) -> Result<Vec<AuditRecord>, SourceError> {
        let conn = self
            .connection
            .as_mut()
            .ok_or_else(|| SourceError::Unavailable(anyhow::anyhow!("No connection available")))?;

        let query = format!("CALL `{}`(?)", self.procedure_name);
        let rows: Vec<Row> = bounded(
            self.timeout,
            "calling the audit procedure",
            conn.exec(query, (since.value(),)),
        )
        .await?;

        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            let record = decode_row(row)?;
            if record.id <= since {
                warn!(
                    "Discarding audit entry {} at or before position {since}",
                    record.id
                );
                continue;
            }
            records.push(record);
        }

        debug!("Read {} audit records after position {since}", records.len());
        Ok(records)
    }

    async fn close(mut self) -> Result<(), SourceError> {
        // Return the connection to the pool before shutting the pool down
        drop(self.connection.take());
        self.pool
            .disconnect()
            .await
            .map_err(|e| SourceError::unavailable("Failed to disconnect MySQL pool", e))
    }
}
