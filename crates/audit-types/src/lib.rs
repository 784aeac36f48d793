//! Core types for zabbix-audit-ship.
//!
//! This crate provides the value types shared by the source, the sink and
//! the pipeline:
//!
//! - [`Position`] - The source-assigned, strictly increasing record id
//! - [`AuditCheckpoint`] - The persisted position of the last shipped record
//! - [`AuditRecord`] - One immutable audit log entry
//! - [`Action`] / [`ResourceType`] - Closed code sets with an unknown fallback
//!
//! # Architecture
//!
//! ```text
//! checkpoint (generic storage)
//!    │
//!    └─── audit-types (this crate)
//!            │
//!            ├─── zabbix-audit-source  (produces AuditRecord)
//!            ├─── splunk-sink          (renders and delivers AuditRecord)
//!            └─── zabbix-audit-ship    (pipeline, CLI)
//! ```

pub mod position;
pub mod record;

pub use position::{AuditCheckpoint, ParsePositionError, Position};
pub use record::{Action, AuditRecord, ResourceType};
