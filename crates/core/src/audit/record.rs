//! Audit records and the sink they are appended to.

use chrono::{DateTime, Utc};
use folio_shared::types::EmployeeId;
use serde::{Deserialize, Serialize};

use super::error::AuditError;

/// What happened to the subject row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// Row created.
    Create,
    /// Row changed.
    Update,
    /// Journal entry committed.
    Post,
    /// Reversal entry committed.
    Reverse,
    /// Period closed.
    Close,
    /// Period reopened.
    Reopen,
    /// Account deactivated.
    Deactivate,
    /// Payment applied to a document.
    ApplyPayment,
    /// Payment application removed.
    VoidPayment,
    /// Document cancelled.
    Cancel,
    /// Approval step decided.
    Decide,
}

impl AuditAction {
    /// Returns the string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Post => "post",
            Self::Reverse => "reverse",
            Self::Close => "close",
            Self::Reopen => "reopen",
            Self::Deactivate => "deactivate",
            Self::ApplyPayment => "apply_payment",
            Self::VoidPayment => "void_payment",
            Self::Cancel => "cancel",
            Self::Decide => "decide",
        }
    }
}

/// A record before the sink assigns its sequence number.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewAuditRecord {
    /// Subject table (e.g. "invoices").
    pub table: String,
    /// Subject row key.
    pub record_id: String,
    /// What happened.
    pub action: AuditAction,
    /// Row before the change.
    pub before: Option<serde_json::Value>,
    /// Row after the change.
    pub after: Option<serde_json::Value>,
    /// Who did it.
    pub actor: EmployeeId,
    /// When.
    pub at: DateTime<Utc>,
}

impl NewAuditRecord {
    /// Starts a record with no snapshots.
    pub fn new(
        table: impl Into<String>,
        record_id: impl ToString,
        action: AuditAction,
        actor: EmployeeId,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            table: table.into(),
            record_id: record_id.to_string(),
            action,
            before: None,
            after: None,
            actor,
            at,
        }
    }

    /// Attaches the before snapshot.
    pub fn before<T: Serialize>(mut self, row: &T) -> Result<Self, AuditError> {
        self.before = Some(serde_json::to_value(row)?);
        Ok(self)
    }

    /// Attaches the after snapshot.
    pub fn after<T: Serialize>(mut self, row: &T) -> Result<Self, AuditError> {
        self.after = Some(serde_json::to_value(row)?);
        Ok(self)
    }
}

/// An appended audit record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditRecord {
    /// Monotonically increasing sequence number.
    pub seq: u64,
    /// Subject table.
    pub table: String,
    /// Subject row key.
    pub record_id: String,
    /// What happened.
    pub action: AuditAction,
    /// Row before the change.
    pub before: Option<serde_json::Value>,
    /// Row after the change.
    pub after: Option<serde_json::Value>,
    /// Who did it.
    pub actor: EmployeeId,
    /// When.
    pub at: DateTime<Utc>,
}

impl AuditRecord {
    /// Stamps a new record with its sequence number.
    #[must_use]
    pub fn sequenced(seq: u64, record: NewAuditRecord) -> Self {
        Self {
            seq,
            table: record.table,
            record_id: record.record_id,
            action: record.action,
            before: record.before,
            after: record.after,
            actor: record.actor,
            at: record.at,
        }
    }
}

/// Append-only audit storage.
///
/// `append_all` must be all-or-nothing: either every record is stored with
/// consecutive sequence numbers, or none is.
pub trait AuditSink: Send + Sync {
    /// Appends records atomically and returns them with sequence numbers.
    fn append_all(&self, records: Vec<NewAuditRecord>) -> Result<Vec<AuditRecord>, AuditError>;

    /// Records about one row, newest first.
    fn history_of(&self, table: &str, record_id: &str) -> Vec<AuditRecord>;

    /// Records by one actor, newest first.
    fn activity_of(&self, actor: EmployeeId) -> Vec<AuditRecord>;
}
