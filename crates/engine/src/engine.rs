//! The engine: shared state, lock tables and the audit hook.
//!
//! Operations are implemented in sibling modules as `impl Engine` blocks,
//! one per area (accounts, periods, posting, documents, approvals,
//! inventory, org).

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use folio_core::accounts::AccountRegistry;
use folio_core::audit::{AuditRecord, AuditSink, NewAuditRecord};
use folio_core::documents::{
    DocumentError, DocumentKind, FinancialDocument, PartyDirectory, Payment,
};
use folio_core::fiscal::PeriodLedger;
use folio_core::inventory::StockLedger;
use folio_core::ledger::{JournalBook, ReferenceTag};
use folio_core::org::Departments;
use folio_core::workflow::{ApprovalInstance, RoleDirectory, Workflow, WorkflowError};
use folio_shared::config::EngineConfig;
use folio_shared::types::{ApprovalInstanceId, DocumentId, EmployeeId, WorkflowId};
use tokio::sync::{Mutex, RwLock};
use tracing::error;

use crate::audit_log::MemoryAuditLog;
use crate::directory::{StaticPartyDirectory, StaticRoleDirectory};
use crate::error::{EngineError, EngineResult};

pub(crate) type Handle<T> = Arc<Mutex<T>>;

/// The general ledger posting and document reconciliation engine.
///
/// All methods take `&self`; share one engine across tasks with `Arc`.
pub struct Engine {
    pub(crate) config: EngineConfig,
    pub(crate) accounts: RwLock<AccountRegistry>,
    pub(crate) periods: RwLock<PeriodLedger>,
    pub(crate) book: RwLock<JournalBook>,
    pub(crate) workflows: RwLock<HashMap<WorkflowId, Workflow>>,
    pub(crate) documents: DashMap<DocumentId, Handle<FinancialDocument>>,
    pub(crate) document_numbers: DashMap<(DocumentKind, String), DocumentId>,
    pub(crate) payments: DashMap<ReferenceTag, Handle<Payment>>,
    pub(crate) approvals: DashMap<ApprovalInstanceId, Handle<ApprovalInstance>>,
    pub(crate) stock: Mutex<StockLedger>,
    pub(crate) departments: Mutex<Departments>,
    pub(crate) audit: Arc<dyn AuditSink>,
    pub(crate) roles: Arc<dyn RoleDirectory>,
    pub(crate) parties: Arc<dyn PartyDirectory>,
}

impl Engine {
    /// Starts building an engine with the given configuration.
    #[must_use]
    pub fn builder(config: EngineConfig) -> EngineBuilder {
        EngineBuilder::new(config)
    }

    /// The configuration this engine runs with.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub(crate) fn lock_timeout(&self) -> Duration {
        self.config.lock_timeout()
    }

    /// Appends audit records; the caller must not have changed anything yet.
    pub(crate) fn record(&self, records: Vec<NewAuditRecord>) -> EngineResult<Vec<AuditRecord>> {
        self.audit.append_all(records).map_err(|e| {
            error!(error = %e, "Audit append failed, operation aborted");
            EngineError::AuditFailed(e)
        })
    }

    pub(crate) fn document_handle(
        &self,
        id: DocumentId,
    ) -> EngineResult<Handle<FinancialDocument>> {
        self.documents
            .get(&id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| DocumentError::DocumentNotFound(id).into())
    }

    pub(crate) fn payment_handle(&self, reference: &ReferenceTag) -> EngineResult<Handle<Payment>> {
        self.payments
            .get(reference)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| DocumentError::PaymentNotFound(reference.clone()).into())
    }

    pub(crate) fn approval_handle(
        &self,
        id: ApprovalInstanceId,
    ) -> EngineResult<Handle<ApprovalInstance>> {
        self.approvals
            .get(&id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| WorkflowError::InstanceNotFound(id).into())
    }

    /// Audit records about one row, newest first.
    #[must_use]
    pub fn history_of(&self, table: &str, record_id: &str) -> Vec<AuditRecord> {
        self.audit.history_of(table, record_id)
    }

    /// Audit records written by one employee, newest first.
    #[must_use]
    pub fn activity_of(&self, actor: EmployeeId) -> Vec<AuditRecord> {
        self.audit.activity_of(actor)
    }
}

/// Builder for [`Engine`].
///
/// Collaborators default to the in-memory implementations: an empty role
/// directory, an empty party directory and a `MemoryAuditLog`.
pub struct EngineBuilder {
    config: EngineConfig,
    audit: Option<Arc<dyn AuditSink>>,
    roles: Option<Arc<dyn RoleDirectory>>,
    parties: Option<Arc<dyn PartyDirectory>>,
}

impl EngineBuilder {
    /// Creates a builder with the given configuration.
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            audit: None,
            roles: None,
            parties: None,
        }
    }

    /// Uses this audit sink.
    #[must_use]
    pub fn audit_sink(mut self, audit: Arc<dyn AuditSink>) -> Self {
        self.audit = Some(audit);
        self
    }

    /// Uses this role directory.
    #[must_use]
    pub fn roles(mut self, roles: Arc<dyn RoleDirectory>) -> Self {
        self.roles = Some(roles);
        self
    }

    /// Uses this party directory.
    #[must_use]
    pub fn parties(mut self, parties: Arc<dyn PartyDirectory>) -> Self {
        self.parties = Some(parties);
        self
    }

    /// Builds an engine with an empty chart, calendar and journal.
    #[must_use]
    pub fn build(self) -> Engine {
        Engine {
            config: self.config,
            accounts: RwLock::new(AccountRegistry::new()),
            periods: RwLock::new(PeriodLedger::new()),
            book: RwLock::new(JournalBook::new()),
            workflows: RwLock::new(HashMap::new()),
            documents: DashMap::new(),
            document_numbers: DashMap::new(),
            payments: DashMap::new(),
            approvals: DashMap::new(),
            stock: Mutex::new(StockLedger::new()),
            departments: Mutex::new(Departments::new()),
            audit: self
                .audit
                .unwrap_or_else(|| Arc::new(MemoryAuditLog::new())),
            roles: self
                .roles
                .unwrap_or_else(|| Arc::new(StaticRoleDirectory::new())),
            parties: self
                .parties
                .unwrap_or_else(|| Arc::new(StaticPartyDirectory::new())),
        }
    }
}
