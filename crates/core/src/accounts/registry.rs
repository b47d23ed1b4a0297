//! In-memory chart of accounts.
//!
//! Mutations are split in two steps: a `prepare_*` call validates against the
//! current chart and returns the account as it would be stored, and `apply`
//! stores it. The engine records the audit entry between the two; the
//! `create_account`/`deactivate`/`set_parent` helpers do both at once.

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

use folio_shared::types::AccountId;

use super::error::{AccountError, ParentProblem};
use super::types::{Account, NewAccount};

/// Chart of accounts with a unique number index.
#[derive(Debug, Clone, Default)]
pub struct AccountRegistry {
    accounts: HashMap<AccountId, Account>,
    by_number: BTreeMap<String, AccountId>,
}

impl AccountRegistry {
    /// Creates an empty chart.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a chart from stored accounts, validating the whole tree.
    ///
    /// Numbers are trimmed as in [`Self::prepare_account`]. Rejects duplicate
    /// IDs, duplicate numbers, dangling parents and cycles.
    pub fn load(accounts: impl IntoIterator<Item = Account>) -> Result<Self, AccountError> {
        let mut registry = Self::new();
        for mut account in accounts {
            account.number = account.number.trim().to_string();
            if account.number.is_empty() {
                return Err(AccountError::EmptyAccountNumber);
            }
            if registry.accounts.contains_key(&account.id) {
                return Err(AccountError::DuplicateAccountId(account.id));
            }
            if registry.by_number.contains_key(&account.number) {
                return Err(AccountError::DuplicateAccountNumber(account.number));
            }
            registry.by_number.insert(account.number.clone(), account.id);
            registry.accounts.insert(account.id, account);
        }

        for account in registry.accounts.values() {
            let Some(parent_id) = account.parent_id else {
                continue;
            };
            if !registry.accounts.contains_key(&parent_id) {
                return Err(AccountError::InvalidParent {
                    account: account.number.clone(),
                    parent_id,
                    reason: ParentProblem::Missing,
                });
            }
            if registry.has_cycle_from(account.id) {
                return Err(AccountError::InvalidParent {
                    account: account.number.clone(),
                    parent_id,
                    reason: ParentProblem::Cycle,
                });
            }
        }

        Ok(registry)
    }

    /// Number of accounts in the chart.
    #[must_use]
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    /// True when the chart has no accounts.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Validates a new account and returns it with a fresh ID, active.
    pub fn prepare_account(&self, input: NewAccount) -> Result<Account, AccountError> {
        let number = input.number.trim().to_string();
        if number.is_empty() {
            return Err(AccountError::EmptyAccountNumber);
        }
        if self.by_number.contains_key(&number) {
            return Err(AccountError::DuplicateAccountNumber(number));
        }
        if let Some(parent_id) = input.parent_id
            && !self.accounts.contains_key(&parent_id)
        {
            return Err(AccountError::InvalidParent {
                account: number,
                parent_id,
                reason: ParentProblem::Missing,
            });
        }

        Ok(Account {
            id: AccountId::new(),
            number,
            balance_type: input
                .balance_type
                .unwrap_or_else(|| input.account_type.normal_balance()),
            name: input.name,
            account_type: input.account_type,
            parent_id: input.parent_id,
            description: input.description,
            is_active: true,
        })
    }

    /// Returns the account as it would look once deactivated.
    ///
    /// Deactivating an inactive account is allowed and changes nothing.
    pub fn prepare_deactivation(&self, id: AccountId) -> Result<Account, AccountError> {
        let mut account = self.resolve(id)?.clone();
        account.is_active = false;
        Ok(account)
    }

    /// Returns the account as it would look under a new parent.
    pub fn prepare_reparent(
        &self,
        id: AccountId,
        parent_id: Option<AccountId>,
    ) -> Result<Account, AccountError> {
        let mut account = self.resolve(id)?.clone();
        if let Some(parent_id) = parent_id {
            if !self.accounts.contains_key(&parent_id) {
                return Err(AccountError::InvalidParent {
                    account: account.number,
                    parent_id,
                    reason: ParentProblem::Missing,
                });
            }
            if self.is_ancestor_or_self(id, parent_id) {
                return Err(AccountError::InvalidParent {
                    account: account.number,
                    parent_id,
                    reason: ParentProblem::Cycle,
                });
            }
        }
        account.parent_id = parent_id;
        Ok(account)
    }

    /// Stores an account obtained from one of the `prepare_*` methods.
    pub fn apply(&mut self, account: Account) {
        if let Some(previous) = self.accounts.get(&account.id)
            && previous.number != account.number
        {
            self.by_number.remove(&previous.number);
        }
        self.by_number.insert(account.number.clone(), account.id);
        self.accounts.insert(account.id, account);
    }

    /// Validates and stores a new account.
    pub fn create_account(&mut self, input: NewAccount) -> Result<Account, AccountError> {
        let account = self.prepare_account(input)?;
        self.apply(account.clone());
        Ok(account)
    }

    /// Marks an account inactive. History stays; new postings are refused.
    pub fn deactivate(&mut self, id: AccountId) -> Result<Account, AccountError> {
        let account = self.prepare_deactivation(id)?;
        self.apply(account.clone());
        Ok(account)
    }

    /// Moves an account under a new parent (or to the top level).
    pub fn set_parent(
        &mut self,
        id: AccountId,
        parent_id: Option<AccountId>,
    ) -> Result<Account, AccountError> {
        let account = self.prepare_reparent(id, parent_id)?;
        self.apply(account.clone());
        Ok(account)
    }

    /// Looks up an account.
    pub fn resolve(&self, id: AccountId) -> Result<&Account, AccountError> {
        self.accounts
            .get(&id)
            .ok_or(AccountError::AccountNotFound(id))
    }

    /// Looks up an account, returning `None` when absent.
    #[must_use]
    pub fn get(&self, id: AccountId) -> Option<&Account> {
        self.accounts.get(&id)
    }

    /// Whether the account is active.
    pub fn is_active(&self, id: AccountId) -> Result<bool, AccountError> {
        self.resolve(id).map(|a| a.is_active)
    }

    /// Returns the account if it exists and is active.
    pub fn ensure_postable(&self, id: AccountId) -> Result<&Account, AccountError> {
        let account = self.resolve(id)?;
        if !account.is_active {
            return Err(AccountError::InactiveAccount(id));
        }
        Ok(account)
    }

    /// Finds an account by its number.
    #[must_use]
    pub fn find_by_number(&self, number: &str) -> Option<&Account> {
        self.by_number
            .get(number)
            .and_then(|id| self.accounts.get(id))
    }

    /// Lists accounts ordered by account number.
    #[must_use]
    pub fn list(&self, include_inactive: bool) -> Vec<&Account> {
        self.by_number
            .values()
            .filter_map(|id| self.accounts.get(id))
            .filter(|a| include_inactive || a.is_active)
            .collect()
    }

    /// Direct children of an account, ordered by number.
    #[must_use]
    pub fn children_of(&self, id: AccountId) -> Vec<&Account> {
        self.by_number
            .values()
            .filter_map(|child| self.accounts.get(child))
            .filter(|a| a.parent_id == Some(id))
            .collect()
    }

    /// All accounts below `id` in the tree, excluding `id` itself.
    #[must_use]
    pub fn descendants_of(&self, id: AccountId) -> Vec<AccountId> {
        let mut out = Vec::new();
        let mut seen = HashSet::new();
        let mut queue = VecDeque::from([id]);
        while let Some(current) = queue.pop_front() {
            for child in self.children_of(current) {
                if seen.insert(child.id) {
                    out.push(child.id);
                    queue.push_back(child.id);
                }
            }
        }
        out
    }

    /// Walks up from `start`; true when `target` is `start` or one of its ancestors.
    fn is_ancestor_or_self(&self, target: AccountId, start: AccountId) -> bool {
        let mut current = Some(start);
        let mut steps = 0;
        while let Some(id) = current {
            if id == target {
                return true;
            }
            steps += 1;
            if steps > self.accounts.len() {
                return true;
            }
            current = self.accounts.get(&id).and_then(|a| a.parent_id);
        }
        false
    }

    fn has_cycle_from(&self, start: AccountId) -> bool {
        let mut current = self.accounts.get(&start).and_then(|a| a.parent_id);
        let mut steps = 0;
        while let Some(id) = current {
            if id == start || steps > self.accounts.len() {
                return true;
            }
            steps += 1;
            current = self.accounts.get(&id).and_then(|a| a.parent_id);
        }
        false
    }
}
