//! Approval workflow tests.

mod common;

use common::{date, setup};
use folio_core::audit::AuditAction;
use folio_core::documents::DocumentKind;
use folio_core::workflow::{
    ApprovalState, Decision, Role, StepDecision, WorkflowError, WorkflowStep,
};
use folio_engine::EngineError;
use folio_shared::types::EmployeeId;
use rust_decimal_macros::dec;

#[tokio::test]
async fn test_two_step_approval() {
    let fx = setup().await;
    let draft = fx
        .draft(DocumentKind::Invoice, "INV-2S", dec!(5000), date(2026, 3, 31))
        .await;
    let instance = fx
        .engine
        .start_approval(fx.invoice_workflow.id, draft.id, fx.clerk)
        .await
        .unwrap();
    assert_eq!(instance.state, ApprovalState::Pending { step: 0 });
    assert_eq!(instance.amount, dec!(5000));

    let state = fx
        .engine
        .decide(instance.id, 0, Decision::Approve, fx.manager)
        .await
        .unwrap();
    assert_eq!(state, ApprovalState::Pending { step: 1 });

    let state = fx
        .engine
        .decide(instance.id, 1, Decision::Approve, fx.controller)
        .await
        .unwrap();
    assert_eq!(state, ApprovalState::Approved);

    let stored = fx.engine.approval(instance.id).await.unwrap();
    assert!(stored.all_required_approved());
    assert_eq!(stored.last_approver(), Some(fx.controller));
}

#[tokio::test]
async fn test_role_must_match_step() {
    let fx = setup().await;
    let draft = fx
        .draft(DocumentKind::Invoice, "INV-ROLE", dec!(100), date(2026, 3, 31))
        .await;
    let instance = fx
        .engine
        .start_approval(fx.invoice_workflow.id, draft.id, fx.clerk)
        .await
        .unwrap();

    let err = fx
        .engine
        .decide(instance.id, 0, Decision::Approve, fx.clerk)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        EngineError::Workflow(WorkflowError::UnauthorizedRole {
            required: Role::Approver,
            actual: Some(Role::Submitter),
            ..
        })
    ));

    // Admin does not stand in for another role.
    let err = fx
        .engine
        .decide(instance.id, 0, Decision::Approve, fx.admin)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        EngineError::Workflow(WorkflowError::UnauthorizedRole { actual: Some(Role::Admin), .. })
    ));

    let stranger = EmployeeId::new();
    let err = fx
        .engine
        .decide(instance.id, 0, Decision::Approve, stranger)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        EngineError::Workflow(WorkflowError::UnauthorizedRole { actual: None, .. })
    ));
    let app_error: folio_shared::AppError = err.into();
    assert!(matches!(app_error, folio_shared::AppError::Forbidden(_)));

    let stored = fx.engine.approval(instance.id).await.unwrap();
    assert_eq!(stored.state, ApprovalState::Pending { step: 0 });
    assert!(stored.decisions.iter().all(Option::is_none));
}

#[tokio::test]
async fn test_wrong_and_repeated_steps() {
    let fx = setup().await;
    let draft = fx
        .draft(DocumentKind::Invoice, "INV-STEP", dec!(100), date(2026, 3, 31))
        .await;
    let instance = fx
        .engine
        .start_approval(fx.invoice_workflow.id, draft.id, fx.clerk)
        .await
        .unwrap();

    let err = fx
        .engine
        .decide(instance.id, 1, Decision::Approve, fx.controller)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        EngineError::Workflow(WorkflowError::WrongStep { expected: Some(0), got: 1 })
    ));

    fx.engine
        .decide(instance.id, 0, Decision::Approve, fx.manager)
        .await
        .unwrap();
    let err = fx
        .engine
        .decide(instance.id, 0, Decision::Approve, fx.manager)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        EngineError::Workflow(WorkflowError::StepAlreadyDecided { step: 0 })
    ));

    let err = fx
        .engine
        .decide(instance.id, 7, Decision::Approve, fx.controller)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Workflow(WorkflowError::WrongStep { got: 7, .. })));
}

#[tokio::test]
async fn test_rejection_is_terminal() {
    let fx = setup().await;
    let draft = fx
        .draft(DocumentKind::Invoice, "INV-REJ", dec!(100), date(2026, 3, 31))
        .await;
    let instance = fx
        .engine
        .start_approval(fx.invoice_workflow.id, draft.id, fx.clerk)
        .await
        .unwrap();

    let state = fx
        .engine
        .decide(
            instance.id,
            0,
            Decision::Reject {
                reason: Some("Wrong customer".into()),
            },
            fx.manager,
        )
        .await
        .unwrap();
    assert_eq!(state, ApprovalState::Rejected { step: 0 });

    let err = fx
        .engine
        .decide(instance.id, 1, Decision::Approve, fx.controller)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Workflow(WorkflowError::InstanceClosed { .. })));

    let stored = fx.engine.approval(instance.id).await.unwrap();
    assert!(matches!(
        &stored.decisions[0],
        Some(StepDecision::Rejected { reason: Some(r), .. }) if r == "Wrong customer"
    ));
    assert_eq!(stored.decisions[1], None);

    let err = fx
        .engine
        .issue_document(
            draft.id,
            instance.id,
            folio_engine::IssueAccounts::new(fx.chart.receivable),
            fx.clerk,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Workflow(WorkflowError::NotApproved { .. })));
}

#[tokio::test]
async fn test_optional_step_auto_skips_below_threshold() {
    let fx = setup().await;
    let workflow = fx
        .engine
        .register_workflow(
            "Large invoice approval",
            DocumentKind::Invoice,
            vec![
                WorkflowStep::optional("Controller review", Role::Controller, Some(dec!(100000))),
                WorkflowStep::required("Manager review", Role::Approver),
            ],
            fx.admin,
        )
        .await
        .unwrap();

    let small = fx
        .draft(DocumentKind::Invoice, "INV-SMALL", dec!(99999.99), date(2026, 3, 31))
        .await;
    let instance = fx
        .engine
        .start_approval(workflow.id, small.id, fx.clerk)
        .await
        .unwrap();
    assert_eq!(instance.state, ApprovalState::Pending { step: 1 });
    assert_eq!(instance.decisions[0], Some(StepDecision::Skipped));
    let err = fx
        .engine
        .decide(instance.id, 0, Decision::Approve, fx.controller)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Workflow(WorkflowError::StepAlreadyDecided { step: 0 })));

    let large = fx
        .draft(DocumentKind::Invoice, "INV-LARGE", dec!(100000), date(2026, 3, 31))
        .await;
    let instance = fx
        .engine
        .start_approval(workflow.id, large.id, fx.clerk)
        .await
        .unwrap();
    assert_eq!(instance.state, ApprovalState::Pending { step: 0 });
    let state = fx
        .engine
        .decide(instance.id, 0, Decision::Approve, fx.controller)
        .await
        .unwrap();
    assert_eq!(state, ApprovalState::Pending { step: 1 });
}

#[tokio::test]
async fn test_all_optional_steps_start_approved() {
    let fx = setup().await;
    let workflow = fx
        .engine
        .register_workflow(
            "Petty bills",
            DocumentKind::Bill,
            vec![WorkflowStep::optional("Accounting glance", Role::Accountant, Some(dec!(500)))],
            fx.admin,
        )
        .await
        .unwrap();
    let bill = fx
        .draft(DocumentKind::Bill, "BILL-PETTY", dec!(40), date(2026, 3, 31))
        .await;

    let instance = fx
        .engine
        .start_approval(workflow.id, bill.id, fx.clerk)
        .await
        .unwrap();
    assert_eq!(instance.state, ApprovalState::Approved);
    assert_eq!(instance.last_approver(), None);
}

#[tokio::test]
async fn test_workflow_kind_must_match_document() {
    let fx = setup().await;
    let bill = fx
        .draft(DocumentKind::Bill, "BILL-K", dec!(100), date(2026, 3, 31))
        .await;
    let err = fx
        .engine
        .start_approval(fx.invoice_workflow.id, bill.id, fx.clerk)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        EngineError::Workflow(WorkflowError::KindMismatch {
            workflow: DocumentKind::Invoice,
            document: DocumentKind::Bill,
        })
    ));

    let err = fx
        .engine
        .register_workflow("Empty", DocumentKind::Bill, Vec::new(), fx.admin)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Workflow(WorkflowError::EmptyWorkflow)));
}

#[tokio::test]
async fn test_decisions_are_audited() {
    let fx = setup().await;
    let draft = fx
        .draft(DocumentKind::Invoice, "INV-AUD", dec!(100), date(2026, 3, 31))
        .await;
    let instance = fx.approve(&draft).await;

    let history = fx
        .engine
        .history_of("approval_instances", &instance.id.to_string());
    let actions: Vec<_> = history.iter().map(|r| r.action).collect();
    assert_eq!(
        actions,
        vec![AuditAction::Decide, AuditAction::Decide, AuditAction::Create]
    );
    assert_eq!(history[0].actor, fx.controller);
    assert_eq!(history[1].actor, fx.manager);
    assert!(history[0].before.is_some() && history[0].after.is_some());
}
