//! The journal book: append-only storage of committed entries.

use std::collections::HashMap;
use std::ops::Range;

use chrono::NaiveDate;
use folio_shared::types::AccountId;
use rust_decimal::Decimal;

use super::error::LedgerError;
use super::service::PostingService;
use super::types::{EntryType, JournalLine, PostingRequest, ReferenceTag};

/// Result of checking a request against the book before committing.
#[derive(Debug)]
pub enum CommitCheck<'a> {
    /// Reference unused; the request may be committed.
    Fresh,
    /// Identical entry already committed under this reference.
    Replay(&'a [JournalLine]),
}

/// Append-only journal. Lines are never edited or removed; corrections
/// are new entries that reverse earlier ones.
///
/// `posted_total` is the sum of every committed debit (and so of every
/// credit). Commits that would take it past `Decimal::MAX` are refused,
/// which keeps every per-account, roll-up and trial balance sum in range.
#[derive(Debug, Clone, Default)]
pub struct JournalBook {
    lines: Vec<JournalLine>,
    entries: HashMap<ReferenceTag, Range<usize>>,
    reversed_by: HashMap<ReferenceTag, ReferenceTag>,
    posted_total: Decimal,
}

impl JournalBook {
    /// Creates an empty book.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of committed entries.
    #[must_use]
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    /// All committed lines in commit order.
    #[must_use]
    pub fn lines(&self) -> &[JournalLine] {
        &self.lines
    }

    /// Sum of all committed debits.
    #[must_use]
    pub fn posted_total(&self) -> Decimal {
        self.posted_total
    }

    /// Lines of the entry with this reference.
    #[must_use]
    pub fn entry(&self, reference: &ReferenceTag) -> Option<&[JournalLine]> {
        self.entries
            .get(reference)
            .and_then(|range| self.lines.get(range.clone()))
    }

    /// Reference of the entry that reversed `reference`, if any.
    #[must_use]
    pub fn reversal_of(&self, reference: &ReferenceTag) -> Option<&ReferenceTag> {
        self.reversed_by.get(reference)
    }

    /// Decides whether `request` is new, a replay, or a conflict.
    ///
    /// A reversal must point at an existing entry that has not been
    /// reversed yet. A new entry must fit under the journal's total.
    pub fn check(&self, request: &PostingRequest) -> Result<CommitCheck<'_>, LedgerError> {
        if let Some(existing) = self.entry(&request.reference) {
            if PostingService::matches_request(existing, request) {
                return Ok(CommitCheck::Replay(existing));
            }
            return Err(LedgerError::DuplicateReference(request.reference.clone()));
        }

        if let Some(original) = &request.reverses {
            if self.entry(original).is_none() {
                return Err(LedgerError::ReferenceNotFound(original.clone()));
            }
            if let Some(reversal) = self.reversal_of(original) {
                return Err(LedgerError::AlreadyReversed {
                    reference: original.clone(),
                    reversal: reversal.clone(),
                });
            }
        }

        let debits = request
            .lines
            .iter()
            .filter(|l| l.entry_type == EntryType::Debit)
            .map(|l| l.amount);
        if self.total_after(debits).is_none() {
            return Err(LedgerError::AmountOutOfRange {
                reference: request.reference.clone(),
            });
        }

        Ok(CommitCheck::Fresh)
    }

    fn total_after(&self, debits: impl IntoIterator<Item = Decimal>) -> Option<Decimal> {
        debits
            .into_iter()
            .try_fold(self.posted_total, Decimal::checked_add)
    }

    /// Appends the lines of one entry.
    ///
    /// All lines must share one reference that is not yet in the book.
    pub fn commit(&mut self, lines: Vec<JournalLine>) -> Result<(), LedgerError> {
        let Some(first) = lines.first() else {
            return Err(LedgerError::EmptyReference);
        };
        let reference = first.reference.clone();
        let reverses = first.reverses.clone();
        if self.entries.contains_key(&reference) {
            return Err(LedgerError::DuplicateReference(reference));
        }
        if lines.iter().any(|l| l.reference != reference) {
            return Err(LedgerError::DuplicateReference(reference));
        }
        let Some(posted_total) = self.total_after(lines.iter().map(|l| l.debit)) else {
            return Err(LedgerError::AmountOutOfRange { reference });
        };

        self.posted_total = posted_total;
        let start = self.lines.len();
        self.lines.extend(lines);
        self.entries.insert(reference.clone(), start..self.lines.len());
        if let Some(original) = reverses {
            self.reversed_by.insert(original, reference);
        }
        Ok(())
    }

    /// Lines effective on or before `as_of` (all lines when `None`).
    pub fn lines_until(&self, as_of: Option<NaiveDate>) -> impl Iterator<Item = &JournalLine> {
        self.lines
            .iter()
            .filter(move |l| as_of.is_none_or(|d| l.effective_date <= d))
    }

    /// Debit and credit totals of one account up to `as_of`.
    #[must_use]
    pub fn totals_for(
        &self,
        account_id: AccountId,
        as_of: Option<NaiveDate>,
    ) -> (Decimal, Decimal) {
        self.lines_until(as_of)
            .filter(|l| l.account_id == account_id)
            .fold((Decimal::ZERO, Decimal::ZERO), |(d, c), l| (d + l.debit, c + l.credit))
    }

    /// Debit and credit totals of every account with activity up to `as_of`.
    #[must_use]
    pub fn totals_by_account(
        &self,
        as_of: Option<NaiveDate>,
    ) -> HashMap<AccountId, (Decimal, Decimal)> {
        let mut totals: HashMap<AccountId, (Decimal, Decimal)> = HashMap::new();
        for line in self.lines_until(as_of) {
            let entry = totals.entry(line.account_id).or_default();
            entry.0 += line.debit;
            entry.1 += line.credit;
        }
        totals
    }

    /// Lines of one account with an effective date in `[from, to]`.
    #[must_use]
    pub fn activity(
        &self,
        account_id: AccountId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Vec<&JournalLine> {
        self.lines
            .iter()
            .filter(|l| l.account_id == account_id)
            .filter(|l| l.effective_date >= from && l.effective_date <= to)
            .collect()
    }
}
