//! Audit errors.

use thiserror::Error;

/// Errors raised while building or appending audit records.
#[derive(Debug, Error)]
pub enum AuditError {
    /// A before/after snapshot could not be serialized.
    #[error("Audit snapshot failed: {0}")]
    Snapshot(#[from] serde_json::Error),

    /// The sink refused the append.
    #[error("Audit append failed: {0}")]
    AppendFailed(String),
}

impl AuditError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Snapshot(_) => "AUDIT_SNAPSHOT_FAILED",
            Self::AppendFailed(_) => "AUDIT_APPEND_FAILED",
        }
    }
}
