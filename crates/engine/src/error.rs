//! Engine error type.
//!
//! Wraps the core module errors and adds the failures only the stateful
//! engine can produce: lock timeouts and audit append failures.

use folio_core::ErrorKind;
use folio_core::accounts::AccountError;
use folio_core::audit::AuditError;
use folio_core::documents::DocumentError;
use folio_core::fiscal::FiscalError;
use folio_core::inventory::InventoryError;
use folio_core::ledger::LedgerError;
use folio_core::org::OrgError;
use folio_core::workflow::WorkflowError;
use folio_shared::AppError;
use thiserror::Error;

/// Result type alias using `EngineError`.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors returned by engine operations.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Chart of accounts error.
    #[error(transparent)]
    Account(#[from] AccountError),

    /// Fiscal calendar error.
    #[error(transparent)]
    Fiscal(#[from] FiscalError),

    /// Posting or journal error.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Invoice, bill or payment error.
    #[error(transparent)]
    Document(#[from] DocumentError),

    /// Approval workflow error.
    #[error(transparent)]
    Workflow(#[from] WorkflowError),

    /// Stock movement error.
    #[error(transparent)]
    Inventory(#[from] InventoryError),

    /// Department error.
    #[error(transparent)]
    Org(#[from] OrgError),

    /// The audit record could not be written, so nothing was committed.
    #[error("Operation aborted, audit append failed: {0}")]
    AuditFailed(#[from] AuditError),

    /// A lock could not be acquired within the configured timeout.
    #[error("Resource busy: {resource}")]
    Busy {
        /// What was locked, e.g. "ledger" or "document <id>".
        resource: String,
    },

    /// Reopening periods is switched off in configuration.
    #[error("Reopening closed periods is disabled")]
    ReopenDisabled,
}

impl EngineError {
    /// Classifies the error for callers deciding whether to retry.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Account(e) => e.kind(),
            Self::Fiscal(e) => e.kind(),
            Self::Ledger(e) => e.kind(),
            Self::Document(e) => e.kind(),
            Self::Workflow(e) => e.kind(),
            Self::Inventory(e) => e.kind(),
            Self::Org(e) => e.kind(),
            Self::AuditFailed(_) => ErrorKind::Integrity,
            Self::Busy { .. } => ErrorKind::Contention,
            Self::ReopenDisabled => ErrorKind::StateConflict,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Account(e) => e.error_code(),
            Self::Fiscal(e) => e.error_code(),
            Self::Ledger(e) => e.error_code(),
            Self::Document(e) => e.error_code(),
            Self::Workflow(e) => e.error_code(),
            Self::Inventory(e) => e.error_code(),
            Self::Org(e) => e.error_code(),
            Self::AuditFailed(_) => "AUDIT_FAILED",
            Self::Busy { .. } => "BUSY",
            Self::ReopenDisabled => "REOPEN_DISABLED",
        }
    }

    /// True if the same call may succeed when retried unchanged.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        self.kind().is_retryable()
    }
}

impl From<EngineError> for AppError {
    fn from(err: EngineError) -> Self {
        if let EngineError::Workflow(inner) = &err
            && inner.is_forbidden()
        {
            return Self::Forbidden(err.to_string());
        }
        let message = err.to_string();
        match err.kind() {
            ErrorKind::Validation => Self::Validation(message),
            ErrorKind::StateConflict => Self::Conflict(message),
            ErrorKind::Contention => Self::Busy(message),
            ErrorKind::Integrity => Self::Integrity(message),
            ErrorKind::NotFound => Self::NotFound(message),
        }
    }
}
