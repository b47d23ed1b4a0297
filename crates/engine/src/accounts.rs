//! Chart of accounts operations.

use chrono::Utc;
use folio_core::accounts::{Account, AccountRegistry, NewAccount};
use folio_core::audit::{AuditAction, NewAuditRecord};
use folio_shared::types::{AccountId, EmployeeId};
use tracing::{info, warn};

use crate::engine::Engine;
use crate::error::EngineResult;
use crate::locks;

const TABLE: &str = "accounts";

impl Engine {
    /// Adds an account to the chart.
    pub async fn create_account(
        &self,
        input: NewAccount,
        actor: EmployeeId,
    ) -> EngineResult<Account> {
        let mut accounts = locks::write(&self.accounts, self.lock_timeout(), "accounts").await?;
        let account = accounts.prepare_account(input).inspect_err(|e| {
            warn!(error = %e, "Account rejected");
        })?;
        self.record(vec![
            NewAuditRecord::new(TABLE, account.id, AuditAction::Create, actor, Utc::now())
                .after(&account)?,
        ])?;
        accounts.apply(account.clone());
        info!(account_id = %account.id, number = %account.number, "Account created");
        Ok(account)
    }

    /// Marks an account inactive. Committed lines stay; new postings are refused.
    pub async fn deactivate_account(
        &self,
        id: AccountId,
        actor: EmployeeId,
    ) -> EngineResult<Account> {
        let mut accounts = locks::write(&self.accounts, self.lock_timeout(), "accounts").await?;
        let before = accounts.resolve(id)?.clone();
        let account = accounts.prepare_deactivation(id)?;
        self.record(vec![
            NewAuditRecord::new(TABLE, id, AuditAction::Deactivate, actor, Utc::now())
                .before(&before)?
                .after(&account)?,
        ])?;
        accounts.apply(account.clone());
        info!(account_id = %id, "Account deactivated");
        Ok(account)
    }

    /// Moves an account under another parent, or to the top level with `None`.
    pub async fn set_account_parent(
        &self,
        id: AccountId,
        parent_id: Option<AccountId>,
        actor: EmployeeId,
    ) -> EngineResult<Account> {
        let mut accounts = locks::write(&self.accounts, self.lock_timeout(), "accounts").await?;
        let before = accounts.resolve(id)?.clone();
        let account = accounts.prepare_reparent(id, parent_id).inspect_err(|e| {
            warn!(account_id = %id, error = %e, "Reparent rejected");
        })?;
        self.record(vec![
            NewAuditRecord::new(TABLE, id, AuditAction::Update, actor, Utc::now())
                .before(&before)?
                .after(&account)?,
        ])?;
        accounts.apply(account.clone());
        info!(account_id = %id, "Account moved");
        Ok(account)
    }

    /// Bulk-loads seeded accounts next to the existing chart.
    ///
    /// The combined tree is validated first (unique ids and numbers, no
    /// dangling parents, no cycles); on any failure nothing is loaded.
    pub async fn load_chart(&self, chart: Vec<Account>, actor: EmployeeId) -> EngineResult<usize> {
        let mut accounts = locks::write(&self.accounts, self.lock_timeout(), "accounts").await?;
        let existing: Vec<Account> = accounts.list(true).into_iter().cloned().collect();
        let loaded = AccountRegistry::load(existing.into_iter().chain(chart.iter().cloned()))
            .inspect_err(|e| {
                warn!(error = %e, "Chart of accounts rejected");
            })?;

        let now = Utc::now();
        let records = chart
            .iter()
            .map(|account| {
                NewAuditRecord::new(TABLE, account.id, AuditAction::Create, actor, now)
                    .after(account)
            })
            .collect::<Result<Vec<_>, _>>()?;
        self.record(records)?;
        *accounts = loaded;
        info!(count = chart.len(), "Chart of accounts loaded");
        Ok(chart.len())
    }

    /// Looks up an account.
    pub async fn account(&self, id: AccountId) -> EngineResult<Account> {
        let accounts = locks::read(&self.accounts, self.lock_timeout(), "accounts").await?;
        Ok(accounts.resolve(id)?.clone())
    }

    /// Looks up an account by its number.
    pub async fn account_by_number(&self, number: &str) -> EngineResult<Option<Account>> {
        let accounts = locks::read(&self.accounts, self.lock_timeout(), "accounts").await?;
        Ok(accounts.find_by_number(number).cloned())
    }

    /// The chart ordered by account number.
    pub async fn accounts(&self, include_inactive: bool) -> EngineResult<Vec<Account>> {
        let accounts = locks::read(&self.accounts, self.lock_timeout(), "accounts").await?;
        Ok(accounts.list(include_inactive).into_iter().cloned().collect())
    }

    /// Direct children of an account.
    pub async fn children_of(&self, id: AccountId) -> EngineResult<Vec<Account>> {
        let accounts = locks::read(&self.accounts, self.lock_timeout(), "accounts").await?;
        accounts.resolve(id)?;
        Ok(accounts.children_of(id).into_iter().cloned().collect())
    }
}
