//! Shared fixtures for engine integration tests.
//!
//! `setup()` builds an engine with a small chart of accounts, the 2026
//! fiscal year, four employees, one customer, one vendor and two-step
//! invoice and bill workflows (manager review, then controller sign-off).

#![allow(dead_code)]
#![allow(clippy::missing_panics_doc)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use chrono::NaiveDate;
use folio_core::accounts::{AccountType, NewAccount};
use folio_core::audit::{AuditError, AuditRecord, AuditSink, NewAuditRecord};
use folio_core::documents::{
    DocumentKind, DocumentLine, FinancialDocument, NewDocument, NewPayment, Payment,
};
use folio_core::fiscal::FiscalPeriod;
use folio_core::ledger::{PostingLine, PostingRequest, ReferenceTag};
use folio_core::workflow::{ApprovalInstance, Decision, Role, Workflow, WorkflowStep};
use folio_engine::{
    Engine, IssueAccounts, MemoryAuditLog, StaticPartyDirectory, StaticRoleDirectory,
};
use folio_shared::config::EngineConfig;
use folio_shared::types::{AccountId, EmployeeId, PartyId};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Audit sink that can be told to fail or to stall.
#[derive(Debug, Default)]
pub struct SwitchableAudit {
    log: MemoryAuditLog,
    failing: AtomicBool,
    delay_ms: AtomicU64,
}

impl SwitchableAudit {
    pub fn fail(&self, on: bool) {
        self.failing.store(on, Ordering::SeqCst);
    }

    /// Blocks every append for `ms` milliseconds.
    pub fn stall(&self, ms: u64) {
        self.delay_ms.store(ms, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.log.len()
    }

    pub fn records(&self) -> Vec<AuditRecord> {
        self.log.records()
    }
}

impl AuditSink for SwitchableAudit {
    fn append_all(&self, records: Vec<NewAuditRecord>) -> Result<Vec<AuditRecord>, AuditError> {
        let delay = self.delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            std::thread::sleep(Duration::from_millis(delay));
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(AuditError::AppendFailed("audit store unavailable".into()));
        }
        self.log.append_all(records)
    }

    fn history_of(&self, table: &str, record_id: &str) -> Vec<AuditRecord> {
        self.log.history_of(table, record_id)
    }

    fn activity_of(&self, actor: EmployeeId) -> Vec<AuditRecord> {
        self.log.activity_of(actor)
    }
}

/// Accounts created by `setup()`.
#[derive(Debug, Clone, Copy)]
pub struct Chart {
    pub assets: AccountId,
    pub cash: AccountId,
    pub receivable: AccountId,
    pub liabilities: AccountId,
    pub payable: AccountId,
    pub tax_payable: AccountId,
    pub revenue: AccountId,
    pub sales_revenue: AccountId,
    pub expenses: AccountId,
    pub office_expense: AccountId,
}

pub struct Fixture {
    pub engine: Arc<Engine>,
    pub audit: Arc<SwitchableAudit>,
    pub roles: Arc<StaticRoleDirectory>,
    /// Admin; creates master data.
    pub admin: EmployeeId,
    /// Holds `Role::Approver`.
    pub manager: EmployeeId,
    /// Holds `Role::Controller`.
    pub controller: EmployeeId,
    /// Holds `Role::Submitter`.
    pub clerk: EmployeeId,
    pub customer: PartyId,
    pub vendor: PartyId,
    pub chart: Chart,
    pub periods: Vec<FiscalPeriod>,
    pub invoice_workflow: Workflow,
    pub bill_workflow: Workflow,
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

pub fn tag(reference: &str) -> ReferenceTag {
    ReferenceTag::new(reference).unwrap()
}

pub async fn setup() -> Fixture {
    setup_with(EngineConfig::default()).await
}

pub async fn setup_with(config: EngineConfig) -> Fixture {
    let admin = EmployeeId::new();
    let manager = EmployeeId::new();
    let controller = EmployeeId::new();
    let clerk = EmployeeId::new();
    let customer = PartyId::new();
    let vendor = PartyId::new();

    let roles = Arc::new(
        StaticRoleDirectory::new()
            .with(admin, Role::Admin)
            .with(manager, Role::Approver)
            .with(controller, Role::Controller)
            .with(clerk, Role::Submitter),
    );
    let parties = Arc::new(StaticPartyDirectory::new().with(customer).with(vendor));
    let audit = Arc::new(SwitchableAudit::default());

    let engine = Arc::new(
        Engine::builder(config)
            .audit_sink(audit.clone())
            .roles(roles.clone())
            .parties(parties)
            .build(),
    );

    let create = |number: &'static str,
                  name: &'static str,
                  account_type: AccountType,
                  parent: Option<AccountId>| {
        let engine = Arc::clone(&engine);
        async move {
            let mut input = NewAccount::new(number, name, account_type);
            if let Some(parent) = parent {
                input = input.under(parent);
            }
            engine.create_account(input, admin).await.unwrap().id
        }
    };

    let assets = create("1000", "Assets", AccountType::Asset, None).await;
    let cash = create("1100", "Cash", AccountType::Asset, Some(assets)).await;
    let receivable = create("1200", "Accounts Receivable", AccountType::Asset, Some(assets)).await;
    let liabilities = create("2000", "Liabilities", AccountType::Liability, None).await;
    let payable =
        create("2100", "Accounts Payable", AccountType::Liability, Some(liabilities)).await;
    let tax_payable =
        create("2200", "Tax Payable", AccountType::Liability, Some(liabilities)).await;
    let revenue = create("4000", "Revenue", AccountType::Revenue, None).await;
    let sales_revenue = create("4100", "Sales Revenue", AccountType::Revenue, Some(revenue)).await;
    let expenses = create("5000", "Expenses", AccountType::Expense, None).await;
    let office_expense =
        create("5100", "Office Expense", AccountType::Expense, Some(expenses)).await;

    let (_, periods) = engine
        .create_fiscal_year("FY2026", date(2026, 1, 1), date(2026, 12, 31), admin)
        .await
        .unwrap();

    let steps = vec![
        WorkflowStep::required("Manager review", Role::Approver),
        WorkflowStep::required("Controller sign-off", Role::Controller),
    ];
    let invoice_workflow = engine
        .register_workflow("Invoice approval", DocumentKind::Invoice, steps.clone(), admin)
        .await
        .unwrap();
    let bill_workflow = engine
        .register_workflow("Bill approval", DocumentKind::Bill, steps, admin)
        .await
        .unwrap();

    Fixture {
        engine,
        audit,
        roles,
        admin,
        manager,
        controller,
        clerk,
        customer,
        vendor,
        chart: Chart {
            assets,
            cash,
            receivable,
            liabilities,
            payable,
            tax_payable,
            revenue,
            sales_revenue,
            expenses,
            office_expense,
        },
        periods,
        invoice_workflow,
        bill_workflow,
    }
}

impl Fixture {
    /// The 2026 period for a month (1-based).
    pub fn period(&self, month: u32) -> &FiscalPeriod {
        &self.periods[month as usize - 1]
    }

    /// Dr Accounts Receivable / Cr Sales Revenue.
    pub fn sale(&self, reference: &str, on: NaiveDate, amount: Decimal) -> PostingRequest {
        PostingRequest::new(
            tag(reference),
            on,
            self.clerk,
            vec![
                PostingLine::debit(self.chart.receivable, amount),
                PostingLine::credit(self.chart.sales_revenue, amount),
            ],
        )
    }

    /// Input for a document dated 2026-03-01, due 2026-03-31, with one line
    /// on the revenue or expense account.
    pub fn draft_input(&self, kind: DocumentKind, number: &str, amount: Decimal) -> NewDocument {
        let (party_id, account_id) = match kind {
            DocumentKind::Invoice => (self.customer, self.chart.sales_revenue),
            DocumentKind::Bill => (self.vendor, self.chart.office_expense),
        };
        NewDocument {
            kind,
            number: number.into(),
            party_id,
            document_date: date(2026, 3, 1),
            due_date: date(2026, 3, 31),
            lines: vec![DocumentLine {
                description: "Services".into(),
                quantity: dec!(1),
                unit_price: amount,
                tax_amount: dec!(0),
                account_id,
            }],
        }
    }

    /// Draft document with one line on the revenue or expense account.
    pub async fn draft(
        &self,
        kind: DocumentKind,
        number: &str,
        amount: Decimal,
        due_date: NaiveDate,
    ) -> FinancialDocument {
        let input = NewDocument {
            due_date,
            ..self.draft_input(kind, number, amount)
        };
        self.engine.create_document(input, self.clerk).await.unwrap()
    }

    /// Runs the document through its workflow up to Approved.
    pub async fn approve(&self, document: &FinancialDocument) -> ApprovalInstance {
        let workflow = match document.kind {
            DocumentKind::Invoice => self.invoice_workflow.id,
            DocumentKind::Bill => self.bill_workflow.id,
        };
        let instance = self
            .engine
            .start_approval(workflow, document.id, self.clerk)
            .await
            .unwrap();
        self.engine
            .decide(instance.id, 0, Decision::Approve, self.manager)
            .await
            .unwrap();
        self.engine
            .decide(instance.id, 1, Decision::Approve, self.controller)
            .await
            .unwrap();
        self.engine.approval(instance.id).await.unwrap()
    }

    /// Creates, approves and posts an invoice dated 2026-03-01.
    pub async fn issued_invoice(&self, number: &str, amount: Decimal) -> FinancialDocument {
        let draft = self
            .draft(DocumentKind::Invoice, number, amount, date(2026, 3, 31))
            .await;
        let approval = self.approve(&draft).await;
        self.engine
            .issue_document(
                draft.id,
                approval.id,
                IssueAccounts::new(self.chart.receivable),
                self.clerk,
            )
            .await
            .unwrap()
    }

    /// Records a customer receipt: Dr Cash / Cr Accounts Receivable.
    pub async fn receipt(&self, reference: &str, amount: Decimal) -> Payment {
        self.engine
            .record_payment(self.receipt_input(reference, amount))
            .await
            .unwrap()
    }

    pub fn receipt_input(&self, reference: &str, amount: Decimal) -> NewPayment {
        NewPayment {
            reference: tag(reference),
            party_id: self.customer,
            payment_date: date(2026, 3, 10),
            amount,
            debit_account: self.chart.cash,
            credit_account: self.chart.receivable,
            recorded_by: self.clerk,
        }
    }
}
