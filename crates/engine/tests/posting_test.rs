//! Posting engine integration tests.
//!
//! Covers validation, atomic commit, idempotent replay, reversals and the
//! balance / trial balance queries built on committed lines.

#![allow(clippy::items_after_statements)]

mod common;

use common::{date, setup, tag};
use folio_core::ErrorKind;
use folio_core::accounts::{AccountType, BalanceType, NewAccount};
use folio_core::ledger::{AccountProblem, LedgerError, PostOutcome, PostingLine, PostingRequest};
use folio_engine::EngineError;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// 7 * 10^28: valid on its own, but two of them exceed `Decimal::MAX`.
fn near_max() -> Decimal {
    Decimal::from_i128_with_scale(7 * 10_i128.pow(28), 0)
}

#[tokio::test]
async fn test_invoice_and_reversal_reflected_in_trial_balance() {
    let fx = setup().await;
    let january = fx.period(1).id;

    let outcome = fx
        .engine
        .post(fx.sale("INV-1", date(2026, 1, 15), dec!(125000)))
        .await
        .unwrap();
    assert!(outcome.is_new());
    assert_eq!(outcome.receipt().period_id, january);
    assert_eq!(outcome.receipt().line_count, 2);

    let trial = fx.engine.trial_balance(january).await.unwrap();
    assert!(trial.is_balanced());
    assert_eq!(trial.total_debit, dec!(125000));
    let receivable = trial.rows.iter().find(|r| r.number == "1200").unwrap();
    assert_eq!((receivable.debit, receivable.credit), (dec!(125000), dec!(0)));
    let sales = trial.rows.iter().find(|r| r.number == "4100").unwrap();
    assert_eq!((sales.debit, sales.credit), (dec!(0), dec!(125000)));

    let reversal = fx
        .engine
        .reverse(&tag("INV-1"), tag("INV-1-REV"), date(2026, 1, 20), fx.clerk)
        .await
        .unwrap();
    assert!(reversal.is_new());

    let trial = fx.engine.trial_balance(january).await.unwrap();
    assert!(trial.rows.is_empty());
    assert_eq!(trial.total_debit, dec!(0));
    assert_eq!(trial.total_credit, dec!(0));

    let lines = fx.engine.entries_for(&tag("INV-1-REV")).await.unwrap();
    assert_eq!(lines.len(), 2);
    assert!(lines.iter().all(|l| l.reverses == Some(tag("INV-1"))));
    assert_eq!(
        fx.engine.reversal_of(&tag("INV-1")).await.unwrap(),
        Some(tag("INV-1-REV"))
    );
    let balance = fx.engine.balance_of(fx.chart.receivable, None).await.unwrap();
    assert_eq!(balance.balance, dec!(0));
    assert_eq!(balance.debit_total, dec!(125000));
    assert_eq!(balance.credit_total, dec!(125000));
}

#[tokio::test]
async fn test_unbalanced_entry_writes_nothing() {
    let fx = setup().await;
    let audit_before = fx.audit.len();
    let request = PostingRequest::new(
        tag("JE-1"),
        date(2026, 2, 3),
        fx.clerk,
        vec![
            PostingLine::debit(fx.chart.cash, dec!(100)),
            PostingLine::credit(fx.chart.sales_revenue, dec!(90)),
        ],
    );

    let err = fx.engine.post(request).await.unwrap_err();
    assert!(matches!(
        err,
        EngineError::Ledger(LedgerError::UnbalancedEntry { debit, credit, .. })
            if debit == dec!(100) && credit == dec!(90)
    ));
    assert!(matches!(
        fx.engine.entries_for(&tag("JE-1")).await,
        Err(EngineError::Ledger(LedgerError::ReferenceNotFound(_)))
    ));
    assert_eq!(fx.audit.len(), audit_before);
}

#[tokio::test]
async fn test_single_line_entry_rejected() {
    let fx = setup().await;
    let request = PostingRequest::new(
        tag("JE-2"),
        date(2026, 2, 3),
        fx.clerk,
        vec![PostingLine::debit(fx.chart.cash, dec!(100))],
    );
    let err = fx.engine.post(request).await.unwrap_err();
    assert!(matches!(
        err,
        EngineError::Ledger(LedgerError::EmptyEntry { count: 1, .. })
    ));
}

#[tokio::test]
async fn test_inactive_and_unknown_accounts_rejected() {
    let fx = setup().await;
    fx.engine
        .deactivate_account(fx.chart.office_expense, fx.admin)
        .await
        .unwrap();

    let request = PostingRequest::new(
        tag("EXP-1"),
        date(2026, 2, 3),
        fx.clerk,
        vec![
            PostingLine::debit(fx.chart.office_expense, dec!(40)),
            PostingLine::credit(fx.chart.cash, dec!(40)),
        ],
    );
    let err = fx.engine.post(request).await.unwrap_err();
    assert!(matches!(
        err,
        EngineError::Ledger(LedgerError::InvalidAccount {
            reason: AccountProblem::Inactive,
            ..
        })
    ));

    let stranger = folio_shared::types::AccountId::new();
    let request = PostingRequest::new(
        tag("EXP-2"),
        date(2026, 2, 3),
        fx.clerk,
        vec![
            PostingLine::debit(stranger, dec!(40)),
            PostingLine::credit(fx.chart.cash, dec!(40)),
        ],
    );
    let err = fx.engine.post(request).await.unwrap_err();
    assert!(matches!(
        err,
        EngineError::Ledger(LedgerError::InvalidAccount {
            reason: AccountProblem::NotFound,
            ..
        })
    ));
}

#[tokio::test]
async fn test_date_outside_calendar_rejected() {
    let fx = setup().await;
    let err = fx
        .engine
        .post(fx.sale("INV-2027", date(2027, 6, 1), dec!(10)))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        EngineError::Ledger(LedgerError::NoPeriodDefined(d)) if d == date(2027, 6, 1)
    ));
}

#[tokio::test]
async fn test_replay_never_double_posts() {
    let fx = setup().await;
    let request = fx.sale("INV-7", date(2026, 2, 10), dec!(500));

    let first = fx.engine.post(request.clone()).await.unwrap();
    let audit_after_first = fx.audit.len();
    let second = fx.engine.post(request).await.unwrap();

    assert!(matches!(first, PostOutcome::Posted(_)));
    assert!(matches!(second, PostOutcome::AlreadyPosted(_)));
    assert_eq!(first.receipt(), second.receipt());
    assert_eq!(fx.audit.len(), audit_after_first);
    assert_eq!(fx.engine.entries_for(&tag("INV-7")).await.unwrap().len(), 2);
    let balance = fx.engine.balance_of(fx.chart.receivable, None).await.unwrap();
    assert_eq!(balance.balance, dec!(500));

    let conflicting = fx.sale("INV-7", date(2026, 2, 10), dec!(501));
    let err = fx.engine.post(conflicting).await.unwrap_err();
    assert!(matches!(
        err,
        EngineError::Ledger(LedgerError::DuplicateReference(r)) if r == tag("INV-7")
    ));
}

#[tokio::test]
async fn test_reversal_rules() {
    let fx = setup().await;
    fx.engine
        .post(fx.sale("INV-8", date(2026, 2, 10), dec!(80)))
        .await
        .unwrap();
    fx.engine
        .reverse(&tag("INV-8"), tag("INV-8-REV"), date(2026, 2, 11), fx.clerk)
        .await
        .unwrap();

    let err = fx
        .engine
        .reverse(&tag("INV-8"), tag("INV-8-REV2"), date(2026, 2, 12), fx.clerk)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        EngineError::Ledger(LedgerError::AlreadyReversed { reversal, .. })
            if reversal == tag("INV-8-REV")
    ));

    let err = fx
        .engine
        .reverse(&tag("NOPE"), tag("NOPE-REV"), date(2026, 2, 12), fx.clerk)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        EngineError::Ledger(LedgerError::ReferenceNotFound(r)) if r == tag("NOPE")
    ));
}

#[tokio::test]
async fn test_balances_as_of_and_cumulative_trial_balance() {
    let fx = setup().await;
    fx.engine
        .post(fx.sale("INV-J", date(2026, 1, 31), dec!(300)))
        .await
        .unwrap();
    fx.engine
        .post(fx.sale("INV-F", date(2026, 2, 1), dec!(200)))
        .await
        .unwrap();

    let january = fx
        .engine
        .balance_of(fx.chart.sales_revenue, Some(date(2026, 1, 31)))
        .await
        .unwrap();
    assert_eq!(january.balance, dec!(300));
    let all = fx
        .engine
        .balance_of(fx.chart.sales_revenue, None)
        .await
        .unwrap();
    assert_eq!(all.balance, dec!(500));

    let trial = fx.engine.trial_balance(fx.period(2).id).await.unwrap();
    assert_eq!(trial.as_of, date(2026, 2, 28));
    assert_eq!(trial.total_debit, dec!(500));
    let trial = fx.engine.trial_balance(fx.period(1).id).await.unwrap();
    assert_eq!(trial.total_debit, dec!(300));
}

#[tokio::test]
async fn test_rollup_balance_includes_descendants() {
    let fx = setup().await;
    fx.engine
        .post(fx.sale("INV-R", date(2026, 4, 2), dec!(200)))
        .await
        .unwrap();
    let cash_sale = PostingRequest::new(
        tag("CS-1"),
        date(2026, 4, 3),
        fx.clerk,
        vec![
            PostingLine::debit(fx.chart.cash, dec!(300)),
            PostingLine::credit(fx.chart.sales_revenue, dec!(300)),
        ],
    );
    fx.engine.post(cash_sale).await.unwrap();

    let assets = fx.engine.rollup_balance_of(fx.chart.assets, None).await.unwrap();
    assert_eq!(assets.balance, dec!(500));
    let own = fx.engine.balance_of(fx.chart.assets, None).await.unwrap();
    assert_eq!(own.balance, dec!(0));
    let revenue = fx.engine.rollup_balance_of(fx.chart.revenue, None).await.unwrap();
    assert_eq!(revenue.balance, dec!(500));
}

#[tokio::test]
async fn test_net_for_type_and_account_activity() {
    let fx = setup().await;
    fx.engine
        .post(fx.sale("INV-A", date(2026, 5, 5), dec!(1000)))
        .await
        .unwrap();
    fx.engine
        .post(fx.sale("INV-B", date(2026, 6, 5), dec!(700)))
        .await
        .unwrap();
    let expense = PostingRequest::new(
        tag("EXP-A"),
        date(2026, 5, 20),
        fx.clerk,
        vec![
            PostingLine::debit(fx.chart.office_expense, dec!(250)),
            PostingLine::credit(fx.chart.cash, dec!(250)),
        ],
    );
    fx.engine.post(expense).await.unwrap();

    let may_revenue = fx
        .engine
        .net_for_type(AccountType::Revenue, date(2026, 5, 1), date(2026, 5, 31))
        .await
        .unwrap();
    assert_eq!(may_revenue, dec!(1000));
    let may_expense = fx
        .engine
        .net_for_type(AccountType::Expense, date(2026, 5, 1), date(2026, 5, 31))
        .await
        .unwrap();
    assert_eq!(may_expense, dec!(250));

    let activity = fx
        .engine
        .account_activity(fx.chart.receivable, date(2026, 6, 1), date(2026, 6, 30))
        .await
        .unwrap();
    assert_eq!(activity.len(), 1);
    assert_eq!(activity[0].reference, tag("INV-B"));
}

#[tokio::test]
async fn test_contra_account_shown_on_opposite_column() {
    let fx = setup().await;
    let allowance = fx
        .engine
        .create_account(
            NewAccount::new("1290", "Allowance for Doubtful Accounts", AccountType::Asset)
                .under(fx.chart.assets)
                .with_balance_type(BalanceType::Credit),
            fx.admin,
        )
        .await
        .unwrap();
    assert!(allowance.is_contra());

    let provision = PostingRequest::new(
        tag("PROV-1"),
        date(2026, 7, 31),
        fx.clerk,
        vec![
            PostingLine::debit(fx.chart.office_expense, dec!(60)),
            PostingLine::credit(allowance.id, dec!(60)),
        ],
    );
    fx.engine.post(provision).await.unwrap();

    let trial = fx.engine.trial_balance_as_of(date(2026, 7, 31)).await.unwrap();
    let row = trial.rows.iter().find(|r| r.account_id == allowance.id).unwrap();
    assert_eq!((row.debit, row.credit), (dec!(0), dec!(60)));
    assert!(trial.is_balanced());
}

#[tokio::test]
async fn test_posting_records_approver_and_audit() {
    let fx = setup().await;
    let request = fx
        .sale("INV-AUD", date(2026, 2, 10), dec!(75))
        .approved_by(fx.manager)
        .described("Consulting February");
    fx.engine.post(request).await.unwrap();

    let lines = fx.engine.entries_for(&tag("INV-AUD")).await.unwrap();
    assert!(lines.iter().all(|l| l.approved_by == Some(fx.manager)));
    assert_eq!(lines[0].line_seq, 1);
    assert_eq!(lines[1].line_seq, 2);
    assert_eq!(lines[0].description.as_deref(), Some("Consulting February"));

    let history = fx.engine.history_of("journal_entries", "INV-AUD");
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].actor, fx.clerk);
    assert!(history[0].after.is_some());
}

#[tokio::test]
async fn test_contra_revenue_reduces_net_for_type() {
    let fx = setup().await;
    let returns = fx
        .engine
        .create_account(
            NewAccount::new("4900", "Sales Returns", AccountType::Revenue)
                .under(fx.chart.revenue)
                .with_balance_type(BalanceType::Debit),
            fx.admin,
        )
        .await
        .unwrap();
    fx.engine
        .post(fx.sale("INV-NET", date(2026, 8, 3), dec!(1000)))
        .await
        .unwrap();
    let refund = PostingRequest::new(
        tag("RET-1"),
        date(2026, 8, 10),
        fx.clerk,
        vec![
            PostingLine::debit(returns.id, dec!(150)),
            PostingLine::credit(fx.chart.receivable, dec!(150)),
        ],
    );
    fx.engine.post(refund).await.unwrap();

    let net = fx
        .engine
        .net_for_type(AccountType::Revenue, date(2026, 8, 1), date(2026, 8, 31))
        .await
        .unwrap();
    assert_eq!(net, dec!(850));
}

#[tokio::test]
async fn test_journal_total_beyond_decimal_range_rejected() {
    let fx = setup().await;
    let march = fx.period(3).id;
    fx.engine
        .post(fx.sale("BIG-1", date(2026, 3, 2), near_max()))
        .await
        .unwrap();
    let audit_before = fx.audit.len();

    let err = fx
        .engine
        .post(fx.sale("BIG-2", date(2026, 3, 3), near_max()))
        .await
        .unwrap_err();
    assert!(matches!(
        &err,
        EngineError::Ledger(LedgerError::AmountOutOfRange { reference })
            if *reference == tag("BIG-2")
    ));
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(fx.audit.len(), audit_before);
    assert!(fx.engine.entries_for(&tag("BIG-2")).await.is_err());

    let trial = fx.engine.trial_balance(march).await.unwrap();
    assert!(trial.is_balanced());
    assert_eq!(trial.total_debit, near_max());
    let rollup = fx.engine.rollup_balance_of(fx.chart.assets, None).await.unwrap();
    assert_eq!(rollup.balance, near_max());
    let revenue = fx
        .engine
        .net_for_type(AccountType::Revenue, date(2026, 3, 1), date(2026, 3, 31))
        .await
        .unwrap();
    assert_eq!(revenue, near_max());
}

#[tokio::test]
async fn test_entry_totals_beyond_decimal_range_rejected() {
    let fx = setup().await;
    let request = PostingRequest::new(
        tag("BIG-4"),
        date(2026, 3, 5),
        fx.clerk,
        vec![
            PostingLine::debit(fx.chart.cash, near_max()),
            PostingLine::debit(fx.chart.receivable, near_max()),
            PostingLine::credit(fx.chart.sales_revenue, near_max()),
            PostingLine::credit(fx.chart.payable, near_max()),
        ],
    );

    let err = fx.engine.post(request).await.unwrap_err();
    assert!(matches!(
        err,
        EngineError::Ledger(LedgerError::AmountOutOfRange { .. })
    ));
    let trial = fx.engine.trial_balance_as_of(date(2026, 3, 31)).await.unwrap();
    assert!(trial.rows.is_empty());
}
