//! Double-entry bookkeeping logic.
//!
//! This module implements the core ledger functionality:
//! - Posting requests and journal lines keyed by a reference tag
//! - Balance validation (at least two lines, positive amounts, debits = credits)
//! - The append-only journal book with idempotent replay detection
//! - Reversal construction
//! - Account balances and trial balance rows

pub mod balance;
pub mod book;
pub mod error;
pub mod service;
pub mod types;
pub mod validation;

#[cfg(test)]
mod balance_props;
#[cfg(test)]
mod validation_props;

pub use balance::{AccountBalance, TrialBalance, TrialBalanceRow, rollup_totals};
pub use book::{CommitCheck, JournalBook};
pub use error::{AccountProblem, LedgerError};
pub use service::{PostingService, account_gate, period_gate};
pub use types::{
    EntryTotals, EntryType, JournalLine, PostOutcome, PostingLine, PostingReceipt, PostingRequest,
    ReferenceTag,
};
pub use validation::validate_lines;
