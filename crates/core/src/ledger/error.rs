//! Ledger error types for posting validation and journal state errors.

use chrono::NaiveDate;
use folio_shared::types::{AccountId, FiscalPeriodId};
use rust_decimal::Decimal;
use thiserror::Error;

use super::types::ReferenceTag;
use crate::error::ErrorKind;

/// Why an account cannot take a posting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountProblem {
    /// The account does not exist.
    NotFound,
    /// The account has been deactivated.
    Inactive,
}

impl std::fmt::Display for AccountProblem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound => f.write_str("account not found"),
            Self::Inactive => f.write_str("account is inactive"),
        }
    }
}

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    // ========== Validation Errors ==========
    /// Reference tag is blank.
    #[error("Reference tag cannot be empty")]
    EmptyReference,

    /// Entry must have at least 2 lines.
    #[error("Entry {reference} must have at least 2 lines, got {count}")]
    EmptyEntry {
        /// The entry's reference tag.
        reference: ReferenceTag,
        /// Number of lines supplied.
        count: usize,
    },

    /// Line amount must be strictly positive.
    #[error("Entry {reference} line {line}: amount must be positive, got {amount}")]
    NonPositiveAmount {
        /// The entry's reference tag.
        reference: ReferenceTag,
        /// 1-based line number.
        line: usize,
        /// The rejected amount.
        amount: Decimal,
    },

    /// Entry is not balanced (debits != credits).
    #[error("Entry {reference} is not balanced. Debit: {debit}, Credit: {credit}")]
    UnbalancedEntry {
        /// The entry's reference tag.
        reference: ReferenceTag,
        /// Total debit amount.
        debit: Decimal,
        /// Total credit amount.
        credit: Decimal,
    },

    /// Entry amounts, or the journal totals they would produce, exceed the
    /// range of `Decimal`.
    #[error("Entry {reference} amounts exceed the supported range")]
    AmountOutOfRange {
        /// The entry's reference tag.
        reference: ReferenceTag,
    },

    /// A line targets an account that cannot take postings.
    #[error("Invalid account {account_id}: {reason}")]
    InvalidAccount {
        /// The rejected account.
        account_id: AccountId,
        /// Why it was rejected.
        reason: AccountProblem,
    },

    // ========== Fiscal Period Errors ==========
    /// No fiscal period found for the effective date.
    #[error("No fiscal period found for date {0}")]
    NoPeriodDefined(NaiveDate),

    /// Fiscal period is closed, no posting allowed.
    #[error("Fiscal period {period_id} is closed, no posting allowed on {date}")]
    PeriodClosed {
        /// The closed period.
        period_id: FiscalPeriodId,
        /// The rejected effective date.
        date: NaiveDate,
    },

    // ========== Journal State Errors ==========
    /// Reference already posted with different content.
    #[error("Reference {0} already posted with different content")]
    DuplicateReference(ReferenceTag),

    /// Reference not found in the journal.
    #[error("Reference not found: {0}")]
    ReferenceNotFound(ReferenceTag),

    /// Entry already has a reversal.
    #[error("Entry {reference} already reversed by {reversal}")]
    AlreadyReversed {
        /// The original entry.
        reference: ReferenceTag,
        /// The existing reversal.
        reversal: ReferenceTag,
    },
}

impl LedgerError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyReference => "EMPTY_REFERENCE",
            Self::EmptyEntry { .. } => "EMPTY_ENTRY",
            Self::NonPositiveAmount { .. } => "NON_POSITIVE_AMOUNT",
            Self::UnbalancedEntry { .. } => "UNBALANCED_ENTRY",
            Self::AmountOutOfRange { .. } => "AMOUNT_OUT_OF_RANGE",
            Self::InvalidAccount { .. } => "INVALID_ACCOUNT",
            Self::NoPeriodDefined(_) => "NO_PERIOD_DEFINED",
            Self::PeriodClosed { .. } => "PERIOD_CLOSED",
            Self::DuplicateReference(_) => "DUPLICATE_REFERENCE",
            Self::ReferenceNotFound(_) => "REFERENCE_NOT_FOUND",
            Self::AlreadyReversed { .. } => "ALREADY_REVERSED",
        }
    }

    /// Returns the error classification.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::EmptyReference
            | Self::EmptyEntry { .. }
            | Self::NonPositiveAmount { .. }
            | Self::UnbalancedEntry { .. }
            | Self::AmountOutOfRange { .. }
            | Self::InvalidAccount { .. }
            | Self::NoPeriodDefined(_) => ErrorKind::Validation,
            Self::PeriodClosed { .. }
            | Self::DuplicateReference(_)
            | Self::AlreadyReversed { .. } => ErrorKind::StateConflict,
            Self::ReferenceNotFound(_) => ErrorKind::NotFound,
        }
    }
}
