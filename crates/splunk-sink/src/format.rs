//! Event line rendering.
//!
//! Each record becomes one line of comma separated `key='value'` pairs:
//!
//! ```text
//! date='2017/07/14 02:40:00 AM UTC', account='Admin', ip='10.0.0.5', action='update', type='Host', name='web01', old='0', new='1'
//! ```
//!
//! The `old`/`new` pair is appended only when both values are present.

use std::fmt::Write;

use audit_types::AuditRecord;
use chrono_tz::Tz;

const TIMESTAMP_FORMAT: &str = "%Y/%m/%d %I:%M:%S %p %Z";

/// Renders audit records as event lines.
#[derive(Clone, Copy, Debug)]
pub struct EventFormatter {
    timezone: Tz,
}

impl Default for EventFormatter {
    fn default() -> Self {
        Self { timezone: Tz::UTC }
    }
}

impl EventFormatter {
    pub fn new(timezone: Tz) -> Self {
        Self { timezone }
    }

    pub fn render(&self, record: &AuditRecord) -> String {
        let timestamp = record
            .timestamp
            .with_timezone(&self.timezone)
            .format(TIMESTAMP_FORMAT);

        let mut line = format!(
            "date='{timestamp}', account='{}', ip='{}', action='{}', type='{}', name='{}'",
            escape(record.actor.as_deref().unwrap_or_default()),
            escape(&record.source_ip),
            record.action,
            record.resource_type,
            escape(&record.resource_name),
        );

        if let Some((old, new)) = record.value_change() {
            // Writing into a String cannot fail
            let _ = write!(line, ", old='{}', new='{}'", escape(old), escape(new));
        }

        line
    }
}

/// Keep values inside their quotes and the event on one line.
fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '\'' => escaped.push_str("\\'"),
            '\r' => escaped.push_str("\\r"),
            '\n' => escaped.push_str("\\n"),
            other => escaped.push(other),
        }
    }
    escaped
}
