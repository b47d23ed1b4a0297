//! Chart of accounts errors.

use folio_shared::types::AccountId;
use thiserror::Error;

use crate::error::ErrorKind;

/// Why a parent link was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParentProblem {
    /// The parent account does not exist.
    Missing,
    /// The link would make an account its own ancestor.
    Cycle,
}

impl std::fmt::Display for ParentProblem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Missing => f.write_str("parent does not exist"),
            Self::Cycle => f.write_str("parent link would create a cycle"),
        }
    }
}

/// Errors raised by the chart of accounts.
#[derive(Debug, Error)]
pub enum AccountError {
    /// Account number already used by another account.
    #[error("Account number already exists: {0}")]
    DuplicateAccountNumber(String),

    /// Account number is blank.
    #[error("Account number cannot be empty")]
    EmptyAccountNumber,

    /// Two accounts in a loaded chart share an ID.
    #[error("Duplicate account id: {0}")]
    DuplicateAccountId(AccountId),

    /// Parent link refused.
    #[error("Invalid parent {parent_id} for account {account}: {reason}")]
    InvalidParent {
        /// Number of the account being linked.
        account: String,
        /// The requested parent.
        parent_id: AccountId,
        /// Why it was refused.
        reason: ParentProblem,
    },

    /// Account not found.
    #[error("Account not found: {0}")]
    AccountNotFound(AccountId),

    /// Account is inactive.
    #[error("Account {0} is inactive")]
    InactiveAccount(AccountId),
}

impl AccountError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::DuplicateAccountNumber(_) => "DUPLICATE_ACCOUNT_NUMBER",
            Self::EmptyAccountNumber => "EMPTY_ACCOUNT_NUMBER",
            Self::DuplicateAccountId(_) => "DUPLICATE_ACCOUNT_ID",
            Self::InvalidParent { .. } => "INVALID_PARENT",
            Self::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::InactiveAccount(_) => "ACCOUNT_INACTIVE",
        }
    }

    /// Returns the error classification.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::DuplicateAccountNumber(_)
            | Self::EmptyAccountNumber
            | Self::DuplicateAccountId(_)
            | Self::InvalidParent { .. } => ErrorKind::Validation,
            Self::InactiveAccount(_) => ErrorKind::StateConflict,
            Self::AccountNotFound(_) => ErrorKind::NotFound,
        }
    }
}
