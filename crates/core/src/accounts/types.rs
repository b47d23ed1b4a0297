//! Account domain types.

use folio_shared::types::AccountId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Account classification in the chart of accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    /// Resources owned (cash, receivables, stock).
    Asset,
    /// Obligations owed (payables, loans).
    Liability,
    /// Owner's residual interest.
    Equity,
    /// Income earned.
    Revenue,
    /// Costs incurred.
    Expense,
}

impl AccountType {
    /// All account types in statement order.
    pub const ALL: [Self; 5] = [
        Self::Asset,
        Self::Liability,
        Self::Equity,
        Self::Revenue,
        Self::Expense,
    ];

    /// Parse an account type from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "asset" => Some(Self::Asset),
            "liability" => Some(Self::Liability),
            "equity" => Some(Self::Equity),
            "revenue" => Some(Self::Revenue),
            "expense" => Some(Self::Expense),
            _ => None,
        }
    }

    /// Returns the string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Asset => "asset",
            Self::Liability => "liability",
            Self::Equity => "equity",
            Self::Revenue => "revenue",
            Self::Expense => "expense",
        }
    }

    /// The balance side accounts of this type normally carry.
    ///
    /// Asset/Expense are debit-normal; Liability/Equity/Revenue are credit-normal.
    #[must_use]
    pub const fn normal_balance(&self) -> BalanceType {
        match self {
            Self::Asset | Self::Expense => BalanceType::Debit,
            Self::Liability | Self::Equity | Self::Revenue => BalanceType::Credit,
        }
    }
}

impl std::fmt::Display for AccountType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The side on which an account's balance increases.
///
/// Usually follows the account type, but contra accounts (accumulated
/// depreciation, sales returns) carry the opposite side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BalanceType {
    /// Balance grows with debits.
    Debit,
    /// Balance grows with credits.
    Credit,
}

impl BalanceType {
    /// Parse a balance type from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "debit" => Some(Self::Debit),
            "credit" => Some(Self::Credit),
            _ => None,
        }
    }

    /// Returns the string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Debit => "debit",
            Self::Credit => "credit",
        }
    }

    /// Signed balance for the given debit and credit totals.
    ///
    /// - Debit-normal: debit - credit
    /// - Credit-normal: credit - debit
    #[must_use]
    pub fn signed(self, debit: Decimal, credit: Decimal) -> Decimal {
        match self {
            Self::Debit => debit - credit,
            Self::Credit => credit - debit,
        }
    }
}

/// A chart of accounts entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// The account ID.
    pub id: AccountId,
    /// Account number, unique across the chart (e.g. "1100").
    pub number: String,
    /// Display name.
    pub name: String,
    /// Classification.
    pub account_type: AccountType,
    /// Side on which the balance grows.
    pub balance_type: BalanceType,
    /// Parent account, if any.
    pub parent_id: Option<AccountId>,
    /// Free-form description.
    pub description: Option<String>,
    /// Inactive accounts keep their history but reject new postings.
    pub is_active: bool,
}

impl Account {
    /// True when the balance side is opposite to the type's normal side.
    #[must_use]
    pub fn is_contra(&self) -> bool {
        self.balance_type != self.account_type.normal_balance()
    }
}

/// Input for creating an account.
#[derive(Debug, Clone)]
pub struct NewAccount {
    /// Account number.
    pub number: String,
    /// Display name.
    pub name: String,
    /// Classification.
    pub account_type: AccountType,
    /// Balance side; `None` uses the type's normal side.
    pub balance_type: Option<BalanceType>,
    /// Parent account.
    pub parent_id: Option<AccountId>,
    /// Free-form description.
    pub description: Option<String>,
}

impl NewAccount {
    /// Creates input for a top-level account with the normal balance side.
    pub fn new(
        number: impl Into<String>,
        name: impl Into<String>,
        account_type: AccountType,
    ) -> Self {
        Self {
            number: number.into(),
            name: name.into(),
            account_type,
            balance_type: None,
            parent_id: None,
            description: None,
        }
    }

    /// Places the account under `parent`.
    #[must_use]
    pub fn under(mut self, parent: AccountId) -> Self {
        self.parent_id = Some(parent);
        self
    }

    /// Overrides the balance side (contra accounts).
    #[must_use]
    pub fn with_balance_type(mut self, balance_type: BalanceType) -> Self {
        self.balance_type = Some(balance_type);
        self
    }
}
