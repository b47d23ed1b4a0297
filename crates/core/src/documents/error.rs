//! Document and payment errors.

use folio_shared::types::{DocumentId, PartyId};
use rust_decimal::Decimal;
use thiserror::Error;

use super::types::{DocumentKind, DocumentStatus};
use crate::error::ErrorKind;
use crate::ledger::ReferenceTag;

/// Errors raised by document and payment operations.
#[derive(Debug, Error)]
pub enum DocumentError {
    // ========== Validation Errors ==========
    /// Document number is blank.
    #[error("Document number cannot be empty")]
    EmptyNumber,

    /// Document has no lines.
    #[error("Document must have at least one line")]
    NoLines,

    /// A line failed validation.
    #[error("Line {index} is invalid: {reason}")]
    InvalidLine {
        /// 1-based line number.
        index: usize,
        /// What is wrong with it.
        reason: &'static str,
    },

    /// Due date is before the document date.
    #[error("Due date must not be before the document date")]
    InvalidDueDate,

    /// Line or document totals do not fit in a `Decimal`.
    #[error("Document {number} amounts exceed the supported range")]
    AmountOutOfRange {
        /// The document number.
        number: String,
    },

    /// Document total is zero.
    #[error("Document total must be positive")]
    ZeroTotal,

    /// Document number already used for this kind.
    #[error("{kind} number already exists: {number}")]
    DuplicateNumber {
        /// Invoice or bill.
        kind: DocumentKind,
        /// The duplicate number.
        number: String,
    },

    /// Party is unknown.
    #[error("Unknown party: {0}")]
    UnknownParty(PartyId),

    /// Payment amount must be positive.
    #[error("Payment amount must be positive, got {0}")]
    NonPositivePayment(Decimal),

    // ========== State Errors ==========
    /// Transition not allowed from the current status.
    #[error("Document {document_id} cannot go from {from} to {to}")]
    InvalidTransition {
        /// The document.
        document_id: DocumentId,
        /// Current status.
        from: DocumentStatus,
        /// Requested status.
        to: DocumentStatus,
    },

    /// Payments can only be applied to open documents.
    #[error("Document {document_id} is {status} and cannot take payments")]
    NotPayable {
        /// The document.
        document_id: DocumentId,
        /// Current status.
        status: DocumentStatus,
    },

    /// Applying the amount would pay more than is owed.
    #[error("Overpayment on document {document_id}: amount {amount}, outstanding {outstanding}")]
    OverpaymentNotAllowed {
        /// The document.
        document_id: DocumentId,
        /// Amount requested.
        amount: Decimal,
        /// Balance still owed.
        outstanding: Decimal,
    },

    /// Payment does not have enough unapplied amount left.
    #[error("Payment {reference} over-allocated: amount {amount}, unallocated {unallocated}")]
    PaymentOverallocated {
        /// The payment.
        reference: ReferenceTag,
        /// Amount requested.
        amount: Decimal,
        /// Amount still free.
        unallocated: Decimal,
    },

    /// Payment already applied to this document.
    #[error("Payment {reference} is already applied to document {document_id}")]
    DuplicateApplication {
        /// The document.
        document_id: DocumentId,
        /// The payment.
        reference: ReferenceTag,
    },

    /// Payment was never applied to this document.
    #[error("Payment {reference} is not applied to document {document_id}")]
    ApplicationNotFound {
        /// The document.
        document_id: DocumentId,
        /// The payment.
        reference: ReferenceTag,
    },

    /// Payment belongs to a different party.
    #[error("Payment {reference} belongs to a different party than document {document_id}")]
    PartyMismatch {
        /// The document.
        document_id: DocumentId,
        /// The payment.
        reference: ReferenceTag,
    },

    /// Document has payments and cannot be cancelled.
    #[error("Document {document_id} has payments of {paid} and cannot be cancelled")]
    HasPayments {
        /// The document.
        document_id: DocumentId,
        /// Amount paid.
        paid: Decimal,
    },

    /// Voiding requires the payment posting to be reversed first.
    #[error("Payment {0} has not been reversed in the ledger")]
    PaymentNotReversed(ReferenceTag),

    /// A reversed payment cannot be applied.
    #[error("Payment {0} has been reversed")]
    PaymentReversed(ReferenceTag),

    // ========== Lookup Errors ==========
    /// Document not found.
    #[error("Document not found: {0}")]
    DocumentNotFound(DocumentId),

    /// Payment not found.
    #[error("Payment not found: {0}")]
    PaymentNotFound(ReferenceTag),
}

impl DocumentError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyNumber => "EMPTY_DOCUMENT_NUMBER",
            Self::NoLines => "NO_LINES",
            Self::InvalidLine { .. } => "INVALID_LINE",
            Self::InvalidDueDate => "INVALID_DUE_DATE",
            Self::AmountOutOfRange { .. } => "AMOUNT_OUT_OF_RANGE",
            Self::ZeroTotal => "ZERO_TOTAL",
            Self::DuplicateNumber { .. } => "DUPLICATE_DOCUMENT_NUMBER",
            Self::UnknownParty(_) => "UNKNOWN_PARTY",
            Self::NonPositivePayment(_) => "NON_POSITIVE_PAYMENT",
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
            Self::NotPayable { .. } => "NOT_PAYABLE",
            Self::OverpaymentNotAllowed { .. } => "OVERPAYMENT_NOT_ALLOWED",
            Self::PaymentOverallocated { .. } => "PAYMENT_OVERALLOCATED",
            Self::DuplicateApplication { .. } => "DUPLICATE_APPLICATION",
            Self::ApplicationNotFound { .. } => "APPLICATION_NOT_FOUND",
            Self::PartyMismatch { .. } => "PARTY_MISMATCH",
            Self::HasPayments { .. } => "HAS_PAYMENTS",
            Self::PaymentNotReversed(_) => "PAYMENT_NOT_REVERSED",
            Self::PaymentReversed(_) => "PAYMENT_REVERSED",
            Self::DocumentNotFound(_) => "DOCUMENT_NOT_FOUND",
            Self::PaymentNotFound(_) => "PAYMENT_NOT_FOUND",
        }
    }

    /// Returns the error classification.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::EmptyNumber
            | Self::NoLines
            | Self::InvalidLine { .. }
            | Self::InvalidDueDate
            | Self::AmountOutOfRange { .. }
            | Self::ZeroTotal
            | Self::DuplicateNumber { .. }
            | Self::UnknownParty(_)
            | Self::NonPositivePayment(_)
            | Self::PartyMismatch { .. } => ErrorKind::Validation,
            Self::InvalidTransition { .. }
            | Self::NotPayable { .. }
            | Self::OverpaymentNotAllowed { .. }
            | Self::PaymentOverallocated { .. }
            | Self::DuplicateApplication { .. }
            | Self::ApplicationNotFound { .. }
            | Self::HasPayments { .. }
            | Self::PaymentNotReversed(_)
            | Self::PaymentReversed(_) => ErrorKind::StateConflict,
            Self::DocumentNotFound(_) | Self::PaymentNotFound(_) => ErrorKind::NotFound,
        }
    }
}
