//! Property-based tests for balances derived from the journal book.

use chrono::{NaiveDate, Utc};
use folio_shared::types::{EmployeeId, FiscalPeriodId};
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::balance::TrialBalance;
use super::book::JournalBook;
use super::service::PostingService;
use super::types::{PostingLine, PostingRequest, ReferenceTag};
use crate::accounts::{AccountRegistry, AccountType, NewAccount};

/// Strategy for (debit account index, credit account index, amount in cents) postings.
fn postings() -> impl Strategy<Value = Vec<(usize, usize, i64)>> {
    prop::collection::vec((0usize..6, 0usize..6, 1i64..10_000_000), 1..25)
}

fn chart() -> AccountRegistry {
    let mut registry = AccountRegistry::new();
    for (number, account_type) in [
        ("1100", AccountType::Asset),
        ("1200", AccountType::Asset),
        ("2100", AccountType::Liability),
        ("3100", AccountType::Equity),
        ("4100", AccountType::Revenue),
        ("5100", AccountType::Expense),
    ] {
        registry
            .create_account(NewAccount::new(number, number, account_type))
            .unwrap();
    }
    registry
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// *For any* sequence of balanced postings, the trial balance columns agree and
    /// the sum of all debits equals the sum of all credits in the book.
    #[test]
    fn prop_trial_balance_always_balances(entries in postings()) {
        let accounts = chart();
        let list = accounts.list(true);
        let mut book = JournalBook::new();
        let date = NaiveDate::from_ymd_opt(2026, 3, 15).unwrap();

        for (i, (dr, cr, cents)) in entries.into_iter().enumerate() {
            let amount = Decimal::new(cents, 2);
            let request = PostingRequest::new(
                ReferenceTag::new(format!("JE-{i}")).unwrap(),
                date,
                EmployeeId::new(),
                vec![
                    PostingLine::debit(list[dr].id, amount),
                    PostingLine::credit(list[cr].id, amount),
                ],
            );
            let (lines, _) = PostingService::prepare(
                &request,
                Utc::now(),
                |_| Ok(()),
                |_| Ok(FiscalPeriodId::new()),
            )
            .unwrap();
            book.commit(lines).unwrap();
        }

        let debits: Decimal = book.lines().iter().map(|l| l.debit).sum();
        let credits: Decimal = book.lines().iter().map(|l| l.credit).sum();
        prop_assert_eq!(debits, credits);

        let totals = book.totals_by_account(Some(date));
        let tb = TrialBalance::build(date, list.iter().copied(), &totals);
        prop_assert!(tb.is_balanced());
    }
}
