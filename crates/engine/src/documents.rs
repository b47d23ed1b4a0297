//! Invoice, bill and payment operations.
//!
//! Each document and each payment sits behind its own mutex, so operations
//! on one document serialize while different documents proceed in
//! parallel. When both are needed the payment is locked first; a ledger
//! read lock taken to check the payment's reversal comes after both. A
//! document change that also posts to the ledger passes its audit record
//! into the ledger commit, so both land in one audit batch or not at all.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use dashmap::mapref::entry::Entry;
use folio_core::audit::{AuditAction, NewAuditRecord};
use folio_core::documents::{
    DocumentError, DocumentKind, FinancialDocument, NewDocument, NewPayment, Payment,
    PaymentApplication,
};
use folio_core::ledger::{LedgerError, PostingLine, PostingRequest, ReferenceTag};
use folio_core::workflow::WorkflowError;
use folio_shared::types::{
    AccountId, ApprovalInstanceId, DocumentId, EmployeeId, PartyId, PaymentId,
};
use rust_decimal::Decimal;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::engine::{Engine, Handle};
use crate::error::EngineResult;
use crate::locks;

const PAYMENTS: &str = "payments";

/// Accounts a document posts against when it is issued or received.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IssueAccounts {
    /// Receivable (invoice) or payable (bill) control account.
    pub control_account: AccountId,
    /// Output or input tax account. Without one, line tax is posted to the
    /// line's own account.
    pub tax_account: Option<AccountId>,
}

impl IssueAccounts {
    /// Posts against a control account only.
    #[must_use]
    pub const fn new(control_account: AccountId) -> Self {
        Self {
            control_account,
            tax_account: None,
        }
    }

    /// Sends line tax to its own account.
    #[must_use]
    pub const fn with_tax_account(mut self, tax_account: AccountId) -> Self {
        self.tax_account = Some(tax_account);
        self
    }
}

/// Ledger reference of a document's posting, e.g. `invoice:INV-1`.
pub fn posting_reference(kind: DocumentKind, number: &str) -> Result<ReferenceTag, LedgerError> {
    ReferenceTag::new(format!("{}:{number}", kind.as_str()))
}

/// Journal lines for issuing an invoice or receiving a bill.
///
/// Invoice: Dr control for the total, Cr each revenue line, Cr tax.
/// Bill: Dr each expense line, Dr tax, Cr control for the total.
fn issue_lines(document: &FinancialDocument, accounts: &IssueAccounts) -> Vec<PostingLine> {
    let entry = |account_id, amount| match document.kind {
        DocumentKind::Invoice => PostingLine::credit(account_id, amount),
        DocumentKind::Bill => PostingLine::debit(account_id, amount),
    };

    let mut lines = Vec::with_capacity(document.lines.len() + 2);
    if document.kind == DocumentKind::Invoice {
        lines.push(PostingLine::debit(accounts.control_account, document.total_amount()));
    }
    for line in &document.lines {
        let amount = if accounts.tax_account.is_some() {
            line.subtotal()
        } else {
            line.line_total()
        };
        if amount > Decimal::ZERO {
            lines.push(entry(line.account_id, amount).with_memo(line.description.clone()));
        }
    }
    if let Some(tax_account) = accounts.tax_account {
        let tax = document.tax_total();
        if tax > Decimal::ZERO {
            lines.push(entry(tax_account, tax).with_memo("Tax"));
        }
    }
    if document.kind == DocumentKind::Bill {
        lines.push(PostingLine::credit(accounts.control_account, document.total_amount()));
    }
    lines
}

fn document_record(
    document: &FinancialDocument,
    action: AuditAction,
    actor: EmployeeId,
) -> NewAuditRecord {
    NewAuditRecord::new(document.kind.table(), document.id, action, actor, Utc::now())
}

impl Engine {
    fn document_handles(&self) -> Vec<Handle<FinancialDocument>> {
        self.documents
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect()
    }

    /// Creates a draft invoice or bill.
    pub async fn create_document(
        &self,
        input: NewDocument,
        actor: EmployeeId,
    ) -> EngineResult<FinancialDocument> {
        if !self.parties.exists(input.party_id) {
            warn!(party_id = %input.party_id, "Document rejected, unknown party");
            return Err(DocumentError::UnknownParty(input.party_id).into());
        }
        let document = FinancialDocument::create(input)
            .inspect_err(|e| warn!(error = %e, "Document rejected"))?;

        let record = document_record(&document, AuditAction::Create, actor).after(&document)?;
        // Reserve the number first; the shard guard must not be held while
        // the audit sink runs.
        let key = (document.kind, document.number.clone());
        match self.document_numbers.entry(key.clone()) {
            Entry::Occupied(_) => {
                warn!(
                    kind = %document.kind,
                    number = %document.number,
                    "Duplicate document number"
                );
                return Err(DocumentError::DuplicateNumber {
                    kind: document.kind,
                    number: document.number,
                }
                .into());
            }
            Entry::Vacant(slot) => {
                slot.insert(document.id);
            }
        }
        if let Err(e) = self.record(vec![record]) {
            self.document_numbers.remove(&key);
            return Err(e);
        }
        self.documents
            .insert(document.id, Arc::new(Mutex::new(document.clone())));

        info!(
            document_id = %document.id,
            kind = %document.kind,
            number = %document.number,
            total = %document.total_amount(),
            "Document created"
        );
        Ok(document)
    }

    /// Posts an approved draft and moves it to Issued (invoice) or Received (bill).
    ///
    /// The approval instance must belong to the document and be Approved;
    /// its last approver is recorded on the journal entry.
    pub async fn issue_document(
        &self,
        document_id: DocumentId,
        approval_id: ApprovalInstanceId,
        accounts: IssueAccounts,
        actor: EmployeeId,
    ) -> EngineResult<FinancialDocument> {
        let wait = self.lock_timeout();
        let document_handle = self.document_handle(document_id)?;
        let approval_handle = self.approval_handle(approval_id)?;
        let mut document =
            locks::lock_owned(document_handle, wait, format!("document {document_id}")).await?;

        let approver = {
            let approval =
                locks::lock_owned(approval_handle, wait, format!("approval {approval_id}")).await?;
            if approval.document_id != document_id {
                return Err(WorkflowError::DocumentMismatch {
                    instance_id: approval_id,
                    document_id,
                }
                .into());
            }
            approval.ensure_approved().inspect_err(|e| {
                warn!(document_id = %document_id, error = %e, "Issue refused, not approved");
            })?;
            approval.last_approver()
        };

        let reference = posting_reference(document.kind, &document.number)?;
        let mut issued = document.clone();
        issued.mark_posted(reference.clone())?;

        let mut request = PostingRequest::new(
            reference,
            document.document_date,
            actor,
            issue_lines(&document, &accounts),
        )
        .described(format!("{} {}", document.kind, document.number));
        if let Some(approver) = approver {
            request = request.approved_by(approver);
        }

        let audit = document_record(&document, AuditAction::Update, actor)
            .before(&*document)?
            .after(&issued)?;
        let outcome = self.commit_entry(request, vec![audit.clone()]).await?;
        if !outcome.is_new() {
            self.record(vec![audit])?;
        }

        *document = issued.clone();
        info!(
            document_id = %document_id,
            kind = %issued.kind,
            number = %issued.number,
            status = %issued.status,
            "Document posted"
        );
        Ok(issued)
    }

    /// Posts a payment entry and registers the payment for allocation.
    ///
    /// Recording the same payment again returns the registered payment.
    pub async fn record_payment(&self, input: NewPayment) -> EngineResult<Payment> {
        if !self.parties.exists(input.party_id) {
            warn!(party_id = %input.party_id, "Payment rejected, unknown party");
            return Err(DocumentError::UnknownParty(input.party_id).into());
        }
        if input.amount <= Decimal::ZERO {
            return Err(DocumentError::NonPositivePayment(input.amount).into());
        }

        let payment = Payment {
            id: PaymentId::new(),
            reference: input.reference.clone(),
            party_id: input.party_id,
            payment_date: input.payment_date,
            amount: input.amount,
            allocated: Decimal::ZERO,
        };
        let request = PostingRequest::new(
            input.reference.clone(),
            input.payment_date,
            input.recorded_by,
            vec![
                PostingLine::debit(input.debit_account, input.amount),
                PostingLine::credit(input.credit_account, input.amount),
            ],
        )
        .described(format!("Payment {}", input.reference));
        let audit = NewAuditRecord::new(
            PAYMENTS,
            &input.reference,
            AuditAction::Create,
            input.recorded_by,
            Utc::now(),
        )
        .after(&payment)?;

        let outcome = self.commit_entry(request, vec![audit]).await?;
        let handle = Arc::clone(
            self.payments
                .entry(input.reference.clone())
                .or_insert_with(|| Arc::new(Mutex::new(payment)))
                .value(),
        );
        let stored = locks::lock_owned(
            handle,
            self.lock_timeout(),
            format!("payment {}", input.reference),
        )
        .await?;

        if outcome.is_new() {
            info!(
                reference = %stored.reference,
                party_id = %stored.party_id,
                amount = %stored.amount,
                "Payment recorded"
            );
        }
        Ok(Payment::clone(&stored))
    }

    /// Applies part of a recorded payment to an open document.
    ///
    /// Fails with `OverpaymentNotAllowed` if `amount` exceeds what is still
    /// owed; on any failure neither the document nor the payment changes.
    pub async fn apply_payment(
        &self,
        document_id: DocumentId,
        amount: Decimal,
        payment_ref: &ReferenceTag,
        actor: EmployeeId,
    ) -> EngineResult<FinancialDocument> {
        let wait = self.lock_timeout();
        let payment_handle = self.payment_handle(payment_ref)?;
        let document_handle = self.document_handle(document_id)?;
        let mut payment =
            locks::lock_owned(payment_handle, wait, format!("payment {payment_ref}")).await?;
        let mut document =
            locks::lock_owned(document_handle, wait, format!("document {document_id}")).await?;

        // Held until the application is installed so a reversal of the
        // payment cannot commit in between.
        let book = locks::read(&self.book, wait, "ledger").await?;
        if book.reversal_of(payment_ref).is_some() {
            return Err(DocumentError::PaymentReversed(payment_ref.clone()).into());
        }
        if payment.party_id != document.party_id {
            return Err(DocumentError::PartyMismatch {
                document_id,
                reference: payment_ref.clone(),
            }
            .into());
        }

        let mut updated = document.clone();
        updated
            .apply_payment(PaymentApplication {
                payment_reference: payment_ref.clone(),
                amount,
                applied_at: Utc::now(),
                applied_by: actor,
            })
            .inspect_err(|e| {
                warn!(
                    document_id = %document_id,
                    amount = %amount,
                    error = %e,
                    "Payment application rejected"
                );
            })?;
        let mut allocated = payment.clone();
        allocated.allocate(amount)?;

        self.record(vec![
            document_record(&document, AuditAction::ApplyPayment, actor)
                .before(&*document)?
                .after(&updated)?,
            NewAuditRecord::new(PAYMENTS, payment_ref, AuditAction::Update, actor, Utc::now())
                .before(&*payment)?
                .after(&allocated)?,
        ])?;

        *payment = allocated;
        *document = updated.clone();
        drop(book);
        info!(
            document_id = %document_id,
            reference = %payment_ref,
            amount = %amount,
            balance = %updated.balance(),
            status = %updated.status,
            "Payment applied"
        );
        Ok(updated)
    }

    /// Removes a payment application after the payment posting was reversed.
    pub async fn void_payment(
        &self,
        document_id: DocumentId,
        payment_ref: &ReferenceTag,
        actor: EmployeeId,
    ) -> EngineResult<FinancialDocument> {
        let wait = self.lock_timeout();
        let payment_handle = self.payment_handle(payment_ref)?;
        let document_handle = self.document_handle(document_id)?;
        let mut payment =
            locks::lock_owned(payment_handle, wait, format!("payment {payment_ref}")).await?;
        let mut document =
            locks::lock_owned(document_handle, wait, format!("document {document_id}")).await?;

        let book = locks::read(&self.book, wait, "ledger").await?;
        if book.reversal_of(payment_ref).is_none() {
            warn!(
                document_id = %document_id,
                reference = %payment_ref,
                "Void refused, payment not reversed"
            );
            return Err(DocumentError::PaymentNotReversed(payment_ref.clone()).into());
        }

        let mut updated = document.clone();
        let application = updated.void_payment(payment_ref)?;
        let mut released = payment.clone();
        released.release(application.amount);

        self.record(vec![
            document_record(&document, AuditAction::VoidPayment, actor)
                .before(&*document)?
                .after(&updated)?,
            NewAuditRecord::new(PAYMENTS, payment_ref, AuditAction::Update, actor, Utc::now())
                .before(&*payment)?
                .after(&released)?,
        ])?;

        *payment = released;
        *document = updated.clone();
        drop(book);
        info!(
            document_id = %document_id,
            reference = %payment_ref,
            amount = %application.amount,
            status = %updated.status,
            "Payment voided"
        );
        Ok(updated)
    }

    /// Cancels a document with nothing paid, reversing its posting if it has one.
    ///
    /// The reversal is dated `effective_date` and uses the reference
    /// `<posting reference>:void`.
    pub async fn cancel_document(
        &self,
        document_id: DocumentId,
        effective_date: NaiveDate,
        actor: EmployeeId,
    ) -> EngineResult<FinancialDocument> {
        let handle = self.document_handle(document_id)?;
        let label = format!("document {document_id}");
        let mut document = locks::lock_owned(handle, self.lock_timeout(), label).await?;

        let mut cancelled = document.clone();
        cancelled.cancel().inspect_err(|e| {
            warn!(document_id = %document_id, error = %e, "Cancel rejected");
        })?;
        let audit = document_record(&document, AuditAction::Cancel, actor)
            .before(&*document)?
            .after(&cancelled)?;

        if let Some(original) = &document.posting_reference {
            let reversal = ReferenceTag::new(format!("{original}:void"))?;
            let outcome = self
                .reverse_entry(original, reversal, effective_date, actor, vec![audit.clone()])
                .await?;
            if !outcome.is_new() {
                self.record(vec![audit])?;
            }
        } else {
            self.record(vec![audit])?;
        }

        *document = cancelled.clone();
        info!(document_id = %document_id, number = %cancelled.number, "Document cancelled");
        Ok(cancelled)
    }

    /// A document as stored.
    pub async fn document(&self, document_id: DocumentId) -> EngineResult<FinancialDocument> {
        let handle = self.document_handle(document_id)?;
        let label = format!("document {document_id}");
        let document = locks::lock_owned(handle, self.lock_timeout(), label).await?;
        Ok(FinancialDocument::clone(&document))
    }

    /// Amount still owed on a document.
    pub async fn outstanding_of(&self, document_id: DocumentId) -> EngineResult<Decimal> {
        Ok(self.document(document_id).await?.balance())
    }

    /// Open documents of one party ordered by due date, with Overdue
    /// derived for `today`.
    pub async fn open_documents_for(
        &self,
        party_id: PartyId,
        today: NaiveDate,
    ) -> EngineResult<Vec<FinancialDocument>> {
        let wait = self.lock_timeout();
        let mut open = Vec::new();
        for handle in self.document_handles() {
            let document = locks::lock_owned(handle, wait, "document").await?;
            if document.party_id == party_id && document.status.is_open() {
                let mut view = FinancialDocument::clone(&document);
                view.status = view.status_on(today);
                open.push(view);
            }
        }
        open.sort_by(|a, b| a.due_date.cmp(&b.due_date).then_with(|| a.number.cmp(&b.number)));
        Ok(open)
    }

    /// Sum of outstanding balances over open documents of one kind: total
    /// receivables for invoices, total payables for bills.
    pub async fn total_outstanding(&self, kind: DocumentKind) -> EngineResult<Decimal> {
        let wait = self.lock_timeout();
        let mut total = Decimal::ZERO;
        for handle in self.document_handles() {
            let document = locks::lock_owned(handle, wait, "document").await?;
            if document.kind == kind && document.status.is_open() {
                total += document.balance();
            }
        }
        Ok(total)
    }

    /// Stores Overdue on every open document past its due date with a
    /// balance left. Returns the documents that changed.
    pub async fn sweep_overdue(
        &self,
        today: NaiveDate,
        actor: EmployeeId,
    ) -> EngineResult<Vec<DocumentId>> {
        let wait = self.lock_timeout();
        let mut changed = Vec::new();
        for handle in self.document_handles() {
            let mut document = locks::lock_owned(handle, wait, "document").await?;
            let mut updated = document.clone();
            if !updated.mark_overdue(today) {
                continue;
            }
            self.record(vec![
                document_record(&document, AuditAction::Update, actor)
                    .before(&*document)?
                    .after(&updated)?,
            ])?;
            changed.push(updated.id);
            *document = updated;
        }
        info!(today = %today, count = changed.len(), "Overdue sweep finished");
        Ok(changed)
    }
}
