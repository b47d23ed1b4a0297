//! Account balance and trial balance calculations.
//!
//! Balances are derived from journal lines on read; nothing here is stored.

use std::collections::HashMap;

use chrono::NaiveDate;
use folio_shared::types::AccountId;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::accounts::{Account, AccountType, BalanceType};

/// Account balance at a point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountBalance {
    /// The account ID.
    pub account_id: AccountId,
    /// Total debit amount.
    pub debit_total: Decimal,
    /// Total credit amount.
    pub credit_total: Decimal,
    /// Net balance, signed by the account's balance type.
    pub balance: Decimal,
}

impl AccountBalance {
    /// Builds a balance from totals.
    #[must_use]
    pub fn new(
        account_id: AccountId,
        balance_type: BalanceType,
        debit: Decimal,
        credit: Decimal,
    ) -> Self {
        Self {
            account_id,
            debit_total: debit,
            credit_total: credit,
            balance: balance_type.signed(debit, credit),
        }
    }
}

/// One account's line in a trial balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrialBalanceRow {
    /// The account ID.
    pub account_id: AccountId,
    /// Account number.
    pub number: String,
    /// Account name.
    pub name: String,
    /// Account type.
    pub account_type: AccountType,
    /// Amount shown in the debit column.
    pub debit: Decimal,
    /// Amount shown in the credit column.
    pub credit: Decimal,
}

/// Trial balance as of a date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrialBalance {
    /// Lines effective on or before this date are included.
    pub as_of: NaiveDate,
    /// One row per account with a non-zero balance, ordered as supplied.
    pub rows: Vec<TrialBalanceRow>,
    /// Sum of the debit column.
    pub total_debit: Decimal,
    /// Sum of the credit column.
    pub total_credit: Decimal,
}

impl TrialBalance {
    /// Builds a trial balance from per-account totals.
    ///
    /// Each account's net balance is placed on its normal side; a negative
    /// net (e.g. an overdrawn bank account, or a contra account against its
    /// type) flips to the other column.
    #[must_use]
    pub fn build<'a>(
        as_of: NaiveDate,
        accounts: impl IntoIterator<Item = &'a Account>,
        totals: &HashMap<AccountId, (Decimal, Decimal)>,
    ) -> Self {
        let mut rows = Vec::new();
        let mut total_debit = Decimal::ZERO;
        let mut total_credit = Decimal::ZERO;

        for account in accounts {
            let Some(&(debit, credit)) = totals.get(&account.id) else {
                continue;
            };
            let net = account.balance_type.signed(debit, credit);
            if net.is_zero() {
                continue;
            }
            let (row_debit, row_credit) = match (account.balance_type, net.is_sign_positive()) {
                (BalanceType::Debit, true) => (net, Decimal::ZERO),
                (BalanceType::Debit, false) => (Decimal::ZERO, -net),
                (BalanceType::Credit, true) => (Decimal::ZERO, net),
                (BalanceType::Credit, false) => (-net, Decimal::ZERO),
            };
            total_debit += row_debit;
            total_credit += row_credit;
            rows.push(TrialBalanceRow {
                account_id: account.id,
                number: account.number.clone(),
                name: account.name.clone(),
                account_type: account.account_type,
                debit: row_debit,
                credit: row_credit,
            });
        }

        Self {
            as_of,
            rows,
            total_debit,
            total_credit,
        }
    }

    /// Whether the debit and credit columns agree.
    #[must_use]
    pub fn is_balanced(&self) -> bool {
        self.total_debit == self.total_credit
    }
}

/// Sums debit and credit totals over a set of accounts.
#[must_use]
pub fn rollup_totals(
    ids: impl IntoIterator<Item = AccountId>,
    totals: &HashMap<AccountId, (Decimal, Decimal)>,
) -> (Decimal, Decimal) {
    ids.into_iter()
        .filter_map(|id| totals.get(&id))
        .fold((Decimal::ZERO, Decimal::ZERO), |(d, c), (ld, lc)| (d + ld, c + lc))
}
