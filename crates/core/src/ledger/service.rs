//! Posting service: turns a posting request into journal lines.
//!
//! Pure logic with no locking. The caller supplies the account and period
//! checks as closures, so the same validation runs against the live chart
//! and calendar in the engine and against stubs in tests.

use chrono::{DateTime, NaiveDate, Utc};
use folio_shared::types::{AccountId, EmployeeId, FiscalPeriodId};
use rust_decimal::Decimal;

use super::error::{AccountProblem, LedgerError};
use super::types::{
    EntryTotals, EntryType, JournalLine, PostingLine, PostingRequest, ReferenceTag,
};
use super::validation::validate_lines;
use crate::accounts::{AccountError, AccountRegistry};
use crate::fiscal::{FiscalError, PeriodLedger};

/// Account check backed by the chart of accounts.
pub fn account_gate(
    accounts: &AccountRegistry,
) -> impl Fn(AccountId) -> Result<(), LedgerError> + '_ {
    move |account_id| match accounts.ensure_postable(account_id) {
        Ok(_) => Ok(()),
        Err(AccountError::InactiveAccount(_)) => Err(LedgerError::InvalidAccount {
            account_id,
            reason: AccountProblem::Inactive,
        }),
        Err(_) => Err(LedgerError::InvalidAccount {
            account_id,
            reason: AccountProblem::NotFound,
        }),
    }
}

/// Period check backed by the fiscal calendar.
pub fn period_gate(
    periods: &PeriodLedger,
) -> impl Fn(NaiveDate) -> Result<FiscalPeriodId, LedgerError> + '_ {
    move |date| match periods.ensure_open_for(date) {
        Ok(period) => Ok(period.id),
        Err(FiscalError::PeriodClosed { period_id, date }) => {
            Err(LedgerError::PeriodClosed { period_id, date })
        }
        Err(_) => Err(LedgerError::NoPeriodDefined(date)),
    }
}

/// Posting service for entry validation and line construction.
pub struct PostingService;

impl PostingService {
    /// Validate a posting request and build its journal lines.
    ///
    /// Checks run in this order and stop at the first failure:
    /// 1. At least 2 lines, every amount positive
    /// 2. Debits equal credits
    /// 3. Every account exists and is active
    /// 4. The effective date falls in an open period
    ///
    /// # Errors
    ///
    /// Returns `LedgerError` if validation fails.
    pub fn prepare<A, P>(
        request: &PostingRequest,
        posted_at: DateTime<Utc>,
        account_check: A,
        period_check: P,
    ) -> Result<(Vec<JournalLine>, EntryTotals), LedgerError>
    where
        A: Fn(AccountId) -> Result<(), LedgerError>,
        P: Fn(NaiveDate) -> Result<FiscalPeriodId, LedgerError>,
    {
        let totals = validate_lines(&request.reference, &request.lines)?;

        for line in &request.lines {
            account_check(line.account_id)?;
        }

        let period_id = period_check(request.effective_date)?;

        let lines = request
            .lines
            .iter()
            .zip(1u32..)
            .map(|(line, line_seq)| {
                let (debit, credit) = match line.entry_type {
                    EntryType::Debit => (line.amount, Decimal::ZERO),
                    EntryType::Credit => (Decimal::ZERO, line.amount),
                };
                JournalLine {
                    reference: request.reference.clone(),
                    line_seq,
                    account_id: line.account_id,
                    debit,
                    credit,
                    effective_date: request.effective_date,
                    period_id,
                    description: request.description.clone(),
                    memo: line.memo.clone(),
                    created_by: request.created_by,
                    approved_by: request.approved_by,
                    reverses: request.reverses.clone(),
                    posted_at,
                }
            })
            .collect();

        Ok((lines, totals))
    }

    /// True when stored lines carry exactly the content of `request`.
    ///
    /// Used to tell an idempotent replay from a conflicting reuse of a
    /// reference. Commit metadata (period, timestamp) is ignored.
    #[must_use]
    pub fn matches_request(existing: &[JournalLine], request: &PostingRequest) -> bool {
        existing.len() == request.lines.len()
            && existing.iter().zip(&request.lines).all(|(stored, line)| {
                stored.account_id == line.account_id
                    && stored.entry_type() == line.entry_type
                    && stored.amount() == line.amount
                    && stored.memo == line.memo
                    && stored.effective_date == request.effective_date
                    && stored.reverses == request.reverses
            })
    }

    /// Lines that exactly offset `original`: same accounts and amounts, sides swapped.
    #[must_use]
    pub fn reversal_lines(original: &[JournalLine]) -> Vec<PostingLine> {
        original
            .iter()
            .map(|line| PostingLine {
                account_id: line.account_id,
                entry_type: line.entry_type().opposite(),
                amount: line.amount(),
                memo: line.memo.clone(),
            })
            .collect()
    }

    /// Builds the request that reverses `original` under a new reference.
    ///
    /// # Errors
    ///
    /// Returns `ReferenceNotFound` if `original` is empty.
    pub fn reversal_request(
        original: &[JournalLine],
        reference: ReferenceTag,
        effective_date: NaiveDate,
        created_by: EmployeeId,
    ) -> Result<PostingRequest, LedgerError> {
        let first = original
            .first()
            .ok_or_else(|| LedgerError::ReferenceNotFound(reference.clone()))?;
        let description = format!("Reversal of {}", first.reference);
        Ok(PostingRequest {
            reference,
            effective_date,
            description: Some(description),
            lines: Self::reversal_lines(original),
            created_by,
            approved_by: None,
            reverses: Some(first.reference.clone()),
        })
    }
}
