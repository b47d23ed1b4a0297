//! Property-based tests for entry validation rules.

use folio_shared::types::AccountId;
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::error::LedgerError;
use super::types::{EntryType, PostingLine, ReferenceTag};
use super::validation::validate_lines;

/// Strategy to generate a valid positive amount (> 0).
fn positive_amount() -> impl Strategy<Value = Decimal> {
    // 0.01 to 1,000,000.00
    (1i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy to generate a non-positive amount (<= 0).
fn non_positive_amount() -> impl Strategy<Value = Decimal> {
    (0i64..100_000_000i64).prop_map(|cents| Decimal::new(-cents, 2))
}

fn tag() -> ReferenceTag {
    ReferenceTag::new("PROP-1").unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// *For any* set of debit amounts balanced by a single credit, validation accepts
    /// the entry and reports equal totals.
    #[test]
    fn prop_balanced_entries_accepted(amounts in prop::collection::vec(positive_amount(), 1..8)) {
        let total: Decimal = amounts.iter().copied().sum();
        let mut lines: Vec<_> = amounts
            .into_iter()
            .map(|a| PostingLine::debit(AccountId::new(), a))
            .collect();
        lines.push(PostingLine::credit(AccountId::new(), total));

        let totals = validate_lines(&tag(), &lines).unwrap();
        prop_assert_eq!(totals.debit, total);
        prop_assert_eq!(totals.credit, total);
    }

    /// *For any* entry whose sides differ, validation rejects it with both totals.
    #[test]
    fn prop_unbalanced_entries_rejected(debit in positive_amount(), credit in positive_amount()) {
        prop_assume!(debit != credit);
        let lines = vec![
            PostingLine::debit(AccountId::new(), debit),
            PostingLine::credit(AccountId::new(), credit),
        ];
        let result = validate_lines(&tag(), &lines);
        prop_assert!(
            matches!(
                result,
                Err(LedgerError::UnbalancedEntry { debit: d, credit: c, .. })
                    if d == debit && c == credit
            ),
            "expected UnbalancedEntry"
        );
    }

    /// *For any* line with amount <= 0, validation rejects the entry even if balanced.
    #[test]
    fn prop_non_positive_amount_rejected(
        bad in non_positive_amount(),
        side in prop_oneof![Just(EntryType::Debit), Just(EntryType::Credit)],
    ) {
        let account = AccountId::new();
        let lines = vec![
            PostingLine { account_id: account, entry_type: side, amount: bad, memo: None },
            PostingLine {
                account_id: account,
                entry_type: side.opposite(),
                amount: bad,
                memo: None,
            },
        ];
        let result = validate_lines(&tag(), &lines);
        prop_assert!(
            matches!(result, Err(LedgerError::NonPositiveAmount { line: 1, .. })),
            "expected NonPositiveAmount"
        );
    }
}
