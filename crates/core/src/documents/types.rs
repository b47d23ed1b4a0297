//! Document and payment domain types.

use chrono::{DateTime, NaiveDate, Utc};
use folio_shared::types::{AccountId, DocumentId, EmployeeId, PartyId, PaymentId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ledger::ReferenceTag;

/// Which side of the business a document sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    /// Sales invoice: a customer owes us.
    Invoice,
    /// Vendor bill: we owe a vendor.
    Bill,
}

impl DocumentKind {
    /// Returns the string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Invoice => "invoice",
            Self::Bill => "bill",
        }
    }

    /// Audit subject table for documents of this kind.
    #[must_use]
    pub const fn table(&self) -> &'static str {
        match self {
            Self::Invoice => "invoices",
            Self::Bill => "bills",
        }
    }

    /// Status a document takes once posted to the ledger.
    #[must_use]
    pub const fn open_status(&self) -> DocumentStatus {
        match self {
            Self::Invoice => DocumentStatus::Issued,
            Self::Bill => DocumentStatus::Received,
        }
    }
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Document lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    /// Being prepared; not yet in the ledger.
    Draft,
    /// Invoice posted and sent to the customer.
    Issued,
    /// Bill posted as received from the vendor.
    Received,
    /// Open past its due date with a balance left.
    Overdue,
    /// Fully paid.
    Paid,
    /// Cancelled before any payment; its posting was reversed.
    Cancelled,
}

impl DocumentStatus {
    /// Returns the string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Issued => "issued",
            Self::Received => "received",
            Self::Overdue => "overdue",
            Self::Paid => "paid",
            Self::Cancelled => "cancelled",
        }
    }

    /// Posted and still awaiting payment.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        matches!(self, Self::Issued | Self::Received | Self::Overdue)
    }
}

impl std::fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One line of an invoice or bill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentLine {
    /// What was sold or bought.
    pub description: String,
    /// Quantity, must be positive.
    pub quantity: Decimal,
    /// Price per unit.
    pub unit_price: Decimal,
    /// Tax on this line, computed by the caller.
    pub tax_amount: Decimal,
    /// Revenue account (invoice) or expense account (bill).
    pub account_id: AccountId,
}

impl DocumentLine {
    /// Quantity times unit price.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.quantity * self.unit_price
    }

    /// Subtotal plus tax.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.subtotal() + self.tax_amount
    }

    /// `line_total`, or `None` when it does not fit in a `Decimal`.
    #[must_use]
    pub fn checked_total(&self) -> Option<Decimal> {
        self.quantity
            .checked_mul(self.unit_price)?
            .checked_add(self.tax_amount)
    }
}

/// Input for creating a document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewDocument {
    /// Invoice or bill.
    pub kind: DocumentKind,
    /// Document number, unique per kind.
    pub number: String,
    /// Customer (invoice) or vendor (bill).
    pub party_id: PartyId,
    /// Document date; also the posting date.
    pub document_date: NaiveDate,
    /// Payment due date.
    pub due_date: NaiveDate,
    /// Lines, at least one.
    pub lines: Vec<DocumentLine>,
}

/// A payment amount applied to a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentApplication {
    /// Reference of the payment posting.
    pub payment_reference: ReferenceTag,
    /// Amount applied.
    pub amount: Decimal,
    /// When it was applied.
    pub applied_at: DateTime<Utc>,
    /// Who applied it.
    pub applied_by: EmployeeId,
}

/// An invoice or a bill.
///
/// Line amounts are non-negative and their total fits in a `Decimal`
/// (checked at creation), so the derived sums below cannot overflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinancialDocument {
    /// Unique identifier.
    pub id: DocumentId,
    /// Invoice or bill.
    pub kind: DocumentKind,
    /// Document number.
    pub number: String,
    /// Customer or vendor.
    pub party_id: PartyId,
    /// Document date.
    pub document_date: NaiveDate,
    /// Payment due date.
    pub due_date: NaiveDate,
    /// Lines; fixed once created.
    pub lines: Vec<DocumentLine>,
    /// Sum of applied payments.
    pub paid_amount: Decimal,
    /// Stored status. Overdue may also be derived; see `status_on`.
    pub status: DocumentStatus,
    /// Reference of the ledger posting, set when issued or received.
    pub posting_reference: Option<ReferenceTag>,
    /// Payments applied, in order.
    pub applications: Vec<PaymentApplication>,
}

impl FinancialDocument {
    /// Sum of line subtotals.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.lines.iter().map(DocumentLine::subtotal).sum()
    }

    /// Sum of line taxes.
    #[must_use]
    pub fn tax_total(&self) -> Decimal {
        self.lines.iter().map(|l| l.tax_amount).sum()
    }

    /// Total amount of the document.
    #[must_use]
    pub fn total_amount(&self) -> Decimal {
        self.lines.iter().map(DocumentLine::line_total).sum()
    }

    /// Amount still owed: total minus paid.
    #[must_use]
    pub fn balance(&self) -> Decimal {
        self.total_amount() - self.paid_amount
    }

    /// True when open, past due and not fully paid.
    #[must_use]
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.status.is_open() && today > self.due_date && self.balance() > Decimal::ZERO
    }

    /// Status as seen on `today`, deriving Overdue without storing it.
    #[must_use]
    pub fn status_on(&self, today: NaiveDate) -> DocumentStatus {
        if self.is_overdue(today) {
            DocumentStatus::Overdue
        } else {
            self.status
        }
    }
}

/// A payment received from a customer or made to a vendor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    /// Unique identifier.
    pub id: PaymentId,
    /// Reference of the payment's ledger posting.
    pub reference: ReferenceTag,
    /// Customer or vendor.
    pub party_id: PartyId,
    /// Payment date.
    pub payment_date: NaiveDate,
    /// Amount paid.
    pub amount: Decimal,
    /// Portion already applied to documents.
    pub allocated: Decimal,
}

impl Payment {
    /// Portion not yet applied to any document.
    #[must_use]
    pub fn unallocated(&self) -> Decimal {
        self.amount - self.allocated
    }
}

/// Input for recording a payment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPayment {
    /// Reference for the payment posting.
    pub reference: ReferenceTag,
    /// Customer or vendor.
    pub party_id: PartyId,
    /// Payment date; also the posting date.
    pub payment_date: NaiveDate,
    /// Amount paid.
    pub amount: Decimal,
    /// Account debited (cash for receipts, payables for vendor payments).
    pub debit_account: AccountId,
    /// Account credited (receivables for receipts, cash for vendor payments).
    pub credit_account: AccountId,
    /// Employee recording the payment.
    pub recorded_by: EmployeeId,
}

/// Customer and vendor master data lives outside the engine.
pub trait PartyDirectory: Send + Sync {
    /// Whether the party exists.
    fn exists(&self, party_id: PartyId) -> bool;
}
