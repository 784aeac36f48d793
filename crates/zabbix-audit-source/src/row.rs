//! Decoding procedure rows into audit records.

use audit_types::{Action, AuditRecord, Position, ResourceType};
use chrono::DateTime;
use mysql_async::Row;

use crate::SourceError;

/// Column layout returned by the audit procedure:
/// `auditid, clock, alias, ip, action, resourcetype, name, oldvalue, newvalue`.
pub(crate) type RawAuditRow = (
    u64,
    i64,
    Option<String>,
    Option<String>,
    i32,
    i32,
    Option<String>,
    Option<String>,
    Option<String>,
);

pub(crate) fn decode_row(row: Row) -> Result<AuditRecord, SourceError> {
    let raw: RawAuditRow = mysql_async::from_row_opt(row)
        .map_err(|e| SourceError::Malformed(format!("unexpected column types: {e}")))?;
    record_from_raw(raw)
}

pub(crate) fn record_from_raw(raw: RawAuditRow) -> Result<AuditRecord, SourceError> {
    let (id, clock, alias, ip, action, resource_type, name, old_value, new_value) = raw;

    let timestamp = DateTime::from_timestamp(clock, 0).ok_or_else(|| {
        SourceError::Malformed(format!("audit entry {id} has out of range clock {clock}"))
    })?;

    Ok(AuditRecord {
        id: Position::new(id),
        timestamp,
        actor: alias.filter(|a| !a.is_empty()),
        source_ip: ip.unwrap_or_default(),
        action: Action::from_code(action),
        resource_type: ResourceType::from_code(resource_type),
        resource_name: name.unwrap_or_default(),
        old_value,
        new_value,
    })
}
