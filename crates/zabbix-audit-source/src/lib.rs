//! Zabbix audit log reader for zabbix-audit-ship
//!
//! Reads audit entries newer than a given position from the Zabbix MySQL
//! database through a stored procedure, which is created on first use.

mod client;
mod error;
mod procedure;
mod row;
mod source;

pub use client::{mysql_opts_from_parts, mysql_opts_from_url, new_mysql_pool};
pub use error::SourceError;
pub use procedure::{
    ensure_audit_procedure, procedure_state, validate_procedure_name, ProcedureState,
    DEFAULT_PROCEDURE_NAME,
};
pub use source::{AuditSource, MySQLAuditSource, MySQLSourceConnector, SourceConnector};

use std::time::Duration;

/// Zabbix database connection options
#[derive(Clone, Debug)]
pub struct SourceOpts {
    /// MySQL connection options (see `mysql_opts_from_url` / `mysql_opts_from_parts`)
    pub connection: mysql_async::Opts,
    /// Name of the stored procedure that returns audit rows
    pub procedure_name: String,
    /// Upper bound for connecting and for each query
    pub timeout: Duration,
}
