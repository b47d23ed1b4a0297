//! Ledger domain types for posting and storing journal entries.

use chrono::{DateTime, NaiveDate, Utc};
use folio_shared::types::{AccountId, EmployeeId, FiscalPeriodId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::LedgerError;

/// Idempotency key of a journal entry, shared by all of its lines.
///
/// Document postings use the document number; payments use the payment
/// reference. A reference can be posted at most once.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ReferenceTag(String);

impl ReferenceTag {
    /// Creates a reference tag; surrounding whitespace is dropped.
    pub fn new(tag: impl Into<String>) -> Result<Self, LedgerError> {
        let tag = tag.into();
        let trimmed = tag.trim();
        if trimmed.is_empty() {
            return Err(LedgerError::EmptyReference);
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Returns the tag as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ReferenceTag {
    type Error = LedgerError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ReferenceTag> for String {
    fn from(tag: ReferenceTag) -> Self {
        tag.0
    }
}

impl std::fmt::Display for ReferenceTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Entry type: either Debit or Credit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    /// Debit entry.
    Debit,
    /// Credit entry.
    Credit,
}

impl EntryType {
    /// The other side.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Debit => Self::Credit,
            Self::Credit => Self::Debit,
        }
    }
}

/// One requested line of a posting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostingLine {
    /// The account to post to.
    pub account_id: AccountId,
    /// Debit or credit.
    pub entry_type: EntryType,
    /// Amount, must be positive.
    pub amount: Decimal,
    /// Optional memo for this line.
    pub memo: Option<String>,
}

impl PostingLine {
    /// A debit line.
    #[must_use]
    pub fn debit(account_id: AccountId, amount: Decimal) -> Self {
        Self {
            account_id,
            entry_type: EntryType::Debit,
            amount,
            memo: None,
        }
    }

    /// A credit line.
    #[must_use]
    pub fn credit(account_id: AccountId, amount: Decimal) -> Self {
        Self {
            account_id,
            entry_type: EntryType::Credit,
            amount,
            memo: None,
        }
    }

    /// Attaches a memo.
    #[must_use]
    pub fn with_memo(mut self, memo: impl Into<String>) -> Self {
        self.memo = Some(memo.into());
        self
    }
}

/// Input for posting a journal entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostingRequest {
    /// Idempotency key for the whole entry.
    pub reference: ReferenceTag,
    /// Date that decides the fiscal period.
    pub effective_date: NaiveDate,
    /// Entry description.
    pub description: Option<String>,
    /// The lines (at least 2, balanced).
    pub lines: Vec<PostingLine>,
    /// Employee creating the entry.
    pub created_by: EmployeeId,
    /// Employee who approved the underlying document, if any.
    pub approved_by: Option<EmployeeId>,
    /// Reference of the entry this one reverses.
    pub reverses: Option<ReferenceTag>,
}

impl PostingRequest {
    /// Creates a request with no description, approver or reversal link.
    #[must_use]
    pub fn new(
        reference: ReferenceTag,
        effective_date: NaiveDate,
        created_by: EmployeeId,
        lines: Vec<PostingLine>,
    ) -> Self {
        Self {
            reference,
            effective_date,
            description: None,
            lines,
            created_by,
            approved_by: None,
            reverses: None,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn described(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Records the approver.
    #[must_use]
    pub fn approved_by(mut self, approver: EmployeeId) -> Self {
        self.approved_by = Some(approver);
        self
    }
}

/// A stored journal line. Immutable once committed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalLine {
    /// Reference tag shared by every line of the entry.
    pub reference: ReferenceTag,
    /// 1-based position within the entry.
    pub line_seq: u32,
    /// The account posted to.
    pub account_id: AccountId,
    /// Debit amount (0 if credit).
    pub debit: Decimal,
    /// Credit amount (0 if debit).
    pub credit: Decimal,
    /// Effective date.
    pub effective_date: NaiveDate,
    /// Fiscal period the date fell into when posted.
    pub period_id: FiscalPeriodId,
    /// Entry description.
    pub description: Option<String>,
    /// Line memo.
    pub memo: Option<String>,
    /// Creating employee.
    pub created_by: EmployeeId,
    /// Approving employee.
    pub approved_by: Option<EmployeeId>,
    /// Reversed entry, when this is a reversal.
    pub reverses: Option<ReferenceTag>,
    /// Commit timestamp.
    pub posted_at: DateTime<Utc>,
}

impl JournalLine {
    /// Debit or credit, from whichever side carries the amount.
    #[must_use]
    pub fn entry_type(&self) -> EntryType {
        if self.debit > Decimal::ZERO {
            EntryType::Debit
        } else {
            EntryType::Credit
        }
    }

    /// The line amount regardless of side.
    #[must_use]
    pub fn amount(&self) -> Decimal {
        self.debit + self.credit
    }
}

/// Entry totals for validation and display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryTotals {
    /// Total debit amount.
    pub debit: Decimal,
    /// Total credit amount.
    pub credit: Decimal,
    /// Whether debits equal credits.
    pub is_balanced: bool,
}

impl EntryTotals {
    /// Creates totals and computes the balanced flag.
    #[must_use]
    pub fn new(debit: Decimal, credit: Decimal) -> Self {
        Self {
            debit,
            credit,
            is_balanced: debit == credit,
        }
    }
}

/// What a committed (or replayed) posting produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostingReceipt {
    /// The entry's reference tag.
    pub reference: ReferenceTag,
    /// Fiscal period the entry landed in.
    pub period_id: FiscalPeriodId,
    /// Number of journal lines.
    pub line_count: usize,
    /// Entry totals.
    pub totals: EntryTotals,
}

impl PostingReceipt {
    /// Builds a receipt from stored lines.
    #[must_use]
    pub fn from_lines(lines: &[JournalLine]) -> Option<Self> {
        let first = lines.first()?;
        let debit = lines.iter().map(|l| l.debit).sum();
        let credit = lines.iter().map(|l| l.credit).sum();
        Some(Self {
            reference: first.reference.clone(),
            period_id: first.period_id,
            line_count: lines.len(),
            totals: EntryTotals::new(debit, credit),
        })
    }
}

/// Result of a post call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PostOutcome {
    /// The entry was committed by this call.
    Posted(PostingReceipt),
    /// An identical entry was already committed; nothing changed.
    AlreadyPosted(PostingReceipt),
}

impl PostOutcome {
    /// The receipt, whichever way the call went.
    #[must_use]
    pub fn receipt(&self) -> &PostingReceipt {
        match self {
            Self::Posted(r) | Self::AlreadyPosted(r) => r,
        }
    }

    /// True when this call committed the entry.
    #[must_use]
    pub fn is_new(&self) -> bool {
        matches!(self, Self::Posted(_))
    }
}
