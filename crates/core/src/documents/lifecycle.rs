//! Document lifecycle transitions.
//!
//! ```text
//! Draft -> Issued | Received          (posted to the ledger)
//! Issued | Received | Overdue -> Paid (balance reaches zero)
//! Paid -> Issued | Received           (a payment is voided)
//! Draft | Issued | Received | Overdue -> Cancelled (nothing paid)
//! ```
//!
//! Every method validates first and mutates only on success, so a failed
//! call leaves the document untouched.

use chrono::NaiveDate;
use folio_shared::types::DocumentId;
use rust_decimal::Decimal;

use super::error::DocumentError;
use super::types::{
    DocumentStatus, FinancialDocument, NewDocument, Payment, PaymentApplication,
};
use crate::ledger::ReferenceTag;

impl FinancialDocument {
    /// Validates input and creates a draft document.
    pub fn create(input: NewDocument) -> Result<Self, DocumentError> {
        let number = input.number.trim().to_string();
        if number.is_empty() {
            return Err(DocumentError::EmptyNumber);
        }
        if input.lines.is_empty() {
            return Err(DocumentError::NoLines);
        }
        for (i, line) in input.lines.iter().enumerate() {
            let index = i + 1;
            if line.quantity <= Decimal::ZERO {
                return Err(DocumentError::InvalidLine {
                    index,
                    reason: "quantity must be positive",
                });
            }
            if line.unit_price < Decimal::ZERO {
                return Err(DocumentError::InvalidLine {
                    index,
                    reason: "unit price cannot be negative",
                });
            }
            if line.tax_amount < Decimal::ZERO {
                return Err(DocumentError::InvalidLine {
                    index,
                    reason: "tax amount cannot be negative",
                });
            }
        }
        if input.due_date < input.document_date {
            return Err(DocumentError::InvalidDueDate);
        }
        let total = input
            .lines
            .iter()
            .try_fold(Decimal::ZERO, |total, line| total.checked_add(line.checked_total()?))
            .ok_or_else(|| DocumentError::AmountOutOfRange {
                number: number.clone(),
            })?;
        if total <= Decimal::ZERO {
            return Err(DocumentError::ZeroTotal);
        }

        Ok(Self {
            id: DocumentId::new(),
            kind: input.kind,
            number,
            party_id: input.party_id,
            document_date: input.document_date,
            due_date: input.due_date,
            lines: input.lines,
            paid_amount: Decimal::ZERO,
            status: DocumentStatus::Draft,
            posting_reference: None,
            applications: Vec::new(),
        })
    }

    /// Moves a draft to Issued (invoice) or Received (bill).
    pub fn mark_posted(&mut self, reference: ReferenceTag) -> Result<(), DocumentError> {
        let to = self.kind.open_status();
        if self.status != DocumentStatus::Draft {
            return Err(self.transition_error(to));
        }
        self.status = to;
        self.posting_reference = Some(reference);
        Ok(())
    }

    /// Applies part of a payment. Reaching a zero balance marks the document Paid.
    ///
    /// The amount is checked against the outstanding balance before the
    /// status, so paying anything on a settled document reports an overpayment.
    pub fn apply_payment(&mut self, application: PaymentApplication) -> Result<(), DocumentError> {
        if application.amount <= Decimal::ZERO {
            return Err(DocumentError::NonPositivePayment(application.amount));
        }
        let outstanding = self.balance();
        if application.amount > outstanding {
            return Err(DocumentError::OverpaymentNotAllowed {
                document_id: self.id,
                amount: application.amount,
                outstanding,
            });
        }
        if !self.status.is_open() {
            return Err(DocumentError::NotPayable {
                document_id: self.id,
                status: self.status,
            });
        }
        if self
            .applications
            .iter()
            .any(|a| a.payment_reference == application.payment_reference)
        {
            return Err(DocumentError::DuplicateApplication {
                document_id: self.id,
                reference: application.payment_reference,
            });
        }

        self.paid_amount += application.amount;
        self.applications.push(application);
        if self.balance().is_zero() {
            self.status = DocumentStatus::Paid;
        }
        Ok(())
    }

    /// Removes a payment application and restores the balance.
    ///
    /// A Paid document returns to its open status.
    pub fn void_payment(
        &mut self,
        reference: &ReferenceTag,
    ) -> Result<PaymentApplication, DocumentError> {
        let position = self
            .applications
            .iter()
            .position(|a| &a.payment_reference == reference)
            .ok_or_else(|| DocumentError::ApplicationNotFound {
                document_id: self.id,
                reference: reference.clone(),
            })?;

        let application = self.applications.remove(position);
        self.paid_amount -= application.amount;
        if self.status == DocumentStatus::Paid {
            self.status = self.kind.open_status();
        }
        Ok(application)
    }

    /// Cancels a document that has nothing paid against it.
    pub fn cancel(&mut self) -> Result<(), DocumentError> {
        if matches!(self.status, DocumentStatus::Paid | DocumentStatus::Cancelled) {
            return Err(self.transition_error(DocumentStatus::Cancelled));
        }
        if self.paid_amount > Decimal::ZERO {
            return Err(DocumentError::HasPayments {
                document_id: self.id,
                paid: self.paid_amount,
            });
        }
        self.status = DocumentStatus::Cancelled;
        Ok(())
    }

    /// Stores Overdue if the document is overdue on `today`. Returns true on change.
    pub fn mark_overdue(&mut self, today: NaiveDate) -> bool {
        if self.status != DocumentStatus::Overdue && self.is_overdue(today) {
            self.status = DocumentStatus::Overdue;
            return true;
        }
        false
    }

    fn transition_error(&self, to: DocumentStatus) -> DocumentError {
        DocumentError::InvalidTransition {
            document_id: self.id,
            from: self.status,
            to,
        }
    }
}

impl Payment {
    /// Reserves `amount` of this payment for a document.
    pub fn allocate(&mut self, amount: Decimal) -> Result<(), DocumentError> {
        if amount <= Decimal::ZERO {
            return Err(DocumentError::NonPositivePayment(amount));
        }
        if amount > self.unallocated() {
            return Err(DocumentError::PaymentOverallocated {
                reference: self.reference.clone(),
                amount,
                unallocated: self.unallocated(),
            });
        }
        self.allocated += amount;
        Ok(())
    }

    /// Returns a previously allocated amount.
    pub fn release(&mut self, amount: Decimal) {
        self.allocated = (self.allocated - amount).max(Decimal::ZERO);
    }
}
