//! In-memory audit sink.

use std::sync::RwLock;

use folio_core::audit::{AuditError, AuditRecord, AuditSink, NewAuditRecord};
use folio_shared::types::EmployeeId;

/// Append-only audit log held in memory.
///
/// Appends take the write lock for the whole batch, so a batch always gets
/// consecutive sequence numbers.
#[derive(Debug, Default)]
pub struct MemoryAuditLog {
    records: RwLock<Vec<AuditRecord>>,
}

impl MemoryAuditLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.read().map_or(0, |records| records.len())
    }

    /// Whether nothing has been recorded yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every record in sequence order.
    #[must_use]
    pub fn records(&self) -> Vec<AuditRecord> {
        self.records
            .read()
            .map(|records| records.clone())
            .unwrap_or_default()
    }

    fn select(&self, keep: impl Fn(&AuditRecord) -> bool) -> Vec<AuditRecord> {
        let Ok(records) = self.records.read() else {
            return Vec::new();
        };
        records.iter().rev().filter(|r| keep(r)).cloned().collect()
    }
}

impl AuditSink for MemoryAuditLog {
    fn append_all(&self, batch: Vec<NewAuditRecord>) -> Result<Vec<AuditRecord>, AuditError> {
        let mut records = self
            .records
            .write()
            .map_err(|e| AuditError::AppendFailed(e.to_string()))?;
        let mut next = records.last().map_or(1, |r| r.seq + 1);
        let mut appended = Vec::with_capacity(batch.len());
        for record in batch {
            appended.push(AuditRecord::sequenced(next, record));
            next += 1;
        }
        records.extend(appended.iter().cloned());
        Ok(appended)
    }

    fn history_of(&self, table: &str, record_id: &str) -> Vec<AuditRecord> {
        self.select(|r| r.table == table && r.record_id == record_id)
    }

    fn activity_of(&self, actor: EmployeeId) -> Vec<AuditRecord> {
        self.select(|r| r.actor == actor)
    }
}
