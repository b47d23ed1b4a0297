//! Property-based tests for payment application.

use chrono::{NaiveDate, Utc};
use folio_shared::types::{AccountId, EmployeeId, PartyId};
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::types::{
    DocumentKind, DocumentLine, DocumentStatus, FinancialDocument, NewDocument, PaymentApplication,
};
use crate::ledger::ReferenceTag;

/// Strategy for a document total between 1.00 and 100,000.00.
fn total() -> impl Strategy<Value = Decimal> {
    (100i64..10_000_000).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy for a sequence of payment attempts, including zero.
fn attempts() -> impl Strategy<Value = Vec<Decimal>> {
    prop::collection::vec((0i64..5_000_000).prop_map(|c| Decimal::new(c, 2)), 1..20)
}

fn issued(total: Decimal) -> FinancialDocument {
    let date = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
    let mut doc = FinancialDocument::create(NewDocument {
        kind: DocumentKind::Bill,
        number: "B-1".into(),
        party_id: PartyId::new(),
        document_date: date,
        due_date: date,
        lines: vec![DocumentLine {
            description: "Supplies".into(),
            quantity: Decimal::ONE,
            unit_price: total,
            tax_amount: Decimal::ZERO,
            account_id: AccountId::new(),
        }],
    })
    .unwrap();
    doc.mark_posted(ReferenceTag::new("bill:B-1").unwrap()).unwrap();
    doc
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// *For any* sequence of payment attempts, paid stays within [0, total],
    /// paid equals the sum of accepted applications, and the document is Paid
    /// exactly when nothing is outstanding.
    #[test]
    fn prop_paid_never_exceeds_total(total in total(), amounts in attempts()) {
        let mut doc = issued(total);
        let mut accepted = Decimal::ZERO;

        for (i, amount) in amounts.into_iter().enumerate() {
            let before = doc.clone();
            let result = doc.apply_payment(PaymentApplication {
                payment_reference: ReferenceTag::new(format!("PAY-{i}")).unwrap(),
                amount,
                applied_at: Utc::now(),
                applied_by: EmployeeId::new(),
            });
            match result {
                Ok(()) => accepted += amount,
                Err(_) => prop_assert_eq!(&doc, &before),
            }

            prop_assert!(doc.paid_amount >= Decimal::ZERO);
            prop_assert!(doc.paid_amount <= doc.total_amount());
            prop_assert_eq!(doc.paid_amount, accepted);
            prop_assert_eq!(doc.status == DocumentStatus::Paid, doc.balance().is_zero());
        }
    }
}
