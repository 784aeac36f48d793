//! Stored procedure provisioning
//!
//! Audit rows are read through a stored procedure so the reader only needs
//! EXECUTE rights once the procedure exists. The procedure is created on
//! first use and left alone afterwards, unless a routine of the same name
//! with a different result layout is found, in which case it is replaced.

use anyhow::{Context, Result};
use mysql_async::{prelude::*, Conn};
use tracing::{info, warn};

use crate::SourceError;

/// Default name of the audit procedure.
///
/// Older audit shippers created `get_audit` with formatted dates and labels
/// instead of raw codes, so a distinct name avoids colliding with them.
pub const DEFAULT_PROCEDURE_NAME: &str = "get_audit_v2";

/// `COMMENT` carried by procedures whose rows the decoder understands.
pub(crate) const PROCEDURE_COMMENT: &str = "zabbix-audit-ship raw rows v2";

/// What `information_schema` says about a procedure name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcedureState {
    Missing,
    /// Created by this crate with the current row layout.
    Current,
    /// Some other routine, with the comment it carries.
    Foreign { comment: String },
}

impl ProcedureState {
    fn from_comment(comment: Option<String>) -> Self {
        match comment {
            None => Self::Missing,
            Some(comment) if comment == PROCEDURE_COMMENT => Self::Current,
            Some(comment) => Self::Foreign { comment },
        }
    }
}

/// Reject names that would need quoting; the name is spliced into SQL text.
pub fn validate_procedure_name(name: &str) -> Result<(), SourceError> {
    let valid = !name.is_empty()
        && name.len() <= 64
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(SourceError::InvalidProcedureName(name.to_string()))
    }
}

/// Body of the audit procedure.
///
/// Returns one row per (audit entry, detail) pair for every entry with
/// `auditid > lastSelect`, ordered by audit id then detail id so repeated
/// calls against unchanged data return identical batches. Codes are returned
/// raw; decoding into labels happens on the client.
pub(crate) fn create_procedure_sql(name: &str) -> String {
    format!(
        "CREATE PROCEDURE `{name}`(IN lastSelect BIGINT UNSIGNED)
        COMMENT '{PROCEDURE_COMMENT}'
        BEGIN
            SET lastSelect = IFNULL(lastSelect, 0);
            SELECT `a1`.`auditid`,
                   `a1`.`clock`,
                   `u`.`alias`,
                   `a1`.`ip`,
                   `a1`.`action`,
                   `a1`.`resourcetype`,
                   COALESCE(NULLIF(`a1`.`resourcename`, ''), `a1`.`details`) AS `name`,
                   `a2`.`oldvalue`,
                   `a2`.`newvalue`
            FROM `auditlog` AS `a1`
            LEFT JOIN `auditlog_details` AS `a2`
                ON `a1`.`auditid` = `a2`.`auditid`
            LEFT JOIN `users` AS `u`
                ON `a1`.`userid` = `u`.`userid`
            WHERE `a1`.`auditid` > lastSelect
            ORDER BY `a1`.`auditid` ASC, `a2`.`auditdetailid` ASC;
        END"
    )
}

/// Look up a procedure of the given name in the current database
pub async fn procedure_state(conn: &mut Conn, name: &str) -> Result<ProcedureState> {
    let comment: Option<String> = conn
        .exec_first(
            "SELECT ROUTINE_COMMENT FROM information_schema.ROUTINES
             WHERE ROUTINE_SCHEMA = DATABASE()
               AND ROUTINE_TYPE = 'PROCEDURE'
               AND ROUTINE_NAME = ?",
            (name,),
        )
        .await
        .with_context(|| format!("Failed to look up stored procedure {name}"))?;
    Ok(ProcedureState::from_comment(comment))
}

/// Create the audit procedure unless a current one already exists.
///
/// Safe to call on every run. Losing a creation race against another
/// process is not an error. A same-named routine with another layout is
/// dropped and recreated.
pub async fn ensure_audit_procedure(conn: &mut Conn, name: &str) -> Result<()> {
    match procedure_state(conn, name).await? {
        ProcedureState::Current => return Ok(()),
        ProcedureState::Missing => {}
        ProcedureState::Foreign { comment } => {
            warn!("Replacing stored procedure {name} (comment '{comment}') with the audit row layout");
            conn.query_drop(format!("DROP PROCEDURE IF EXISTS `{name}`"))
                .await
                .with_context(|| format!("Failed to drop stored procedure {name}"))?;
        }
    }

    match conn.query_drop(create_procedure_sql(name)).await {
        Ok(_) => info!("Created stored procedure: {name}"),
        Err(e) if e.to_string().contains("already exists") => {
            info!("Stored procedure already exists: {name}");
        }
        Err(e) => return Err(e.into()),
    }

    Ok(())
}
