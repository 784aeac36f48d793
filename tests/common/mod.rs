//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use audit_types::{Action, AuditRecord, Position, ResourceType};
use chrono::DateTime;
use zabbix_audit_source::{AuditSource, SourceConnector, SourceError};

pub fn record(id: u64) -> AuditRecord {
    AuditRecord {
        id: Position::new(id),
        timestamp: DateTime::from_timestamp(1_500_000_000 + id as i64 * 60, 0).unwrap(),
        actor: Some("Admin".to_string()),
        source_ip: "192.168.1.10".to_string(),
        action: Action::Update,
        resource_type: ResourceType::Host,
        resource_name: format!("host-{id}"),
        old_value: Some("0".to_string()),
        new_value: Some("1".to_string()),
    }
}

pub fn records(ids: &[u64]) -> Vec<AuditRecord> {
    ids.iter().copied().map(record).collect()
}

/// Source serving a fixed set of records, filtered by position like the
/// stored procedure does.
#[derive(Clone, Default)]
pub struct FakeSource {
    pub records: Vec<AuditRecord>,
    pub fail_read: bool,
    pub reads: Arc<Mutex<Vec<Position>>>,
    pub closes: Arc<AtomicUsize>,
}

impl FakeSource {
    pub fn with(ids: &[u64]) -> Self {
        Self {
            records: records(ids),
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail_read: true,
            ..Self::default()
        }
    }

    pub fn reads(&self) -> Vec<Position> {
        self.reads.lock().unwrap().clone()
    }
}

#[async_trait]
impl SourceConnector for FakeSource {
    type Source = FakeSource;

    async fn connect(&self) -> Result<Self::Source, SourceError> {
        Ok(self.clone())
    }
}

#[async_trait]
impl AuditSource for FakeSource {
    fn source_type(&self) -> &'static str {
        "fake"
    }

    async fn read_since(&mut self, since: Position) -> Result<Vec<AuditRecord>, SourceError> {
        self.reads.lock().unwrap().push(since);
        if self.fail_read {
            return Err(SourceError::Unavailable(anyhow::anyhow!(
                "connection refused"
            )));
        }
        Ok(self
            .records
            .iter()
            .filter(|r| r.id > since)
            .cloned()
            .collect())
    }

    async fn close(self) -> Result<(), SourceError> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
