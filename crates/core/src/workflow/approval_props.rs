//! Property-based tests for approval instances.

use chrono::Utc;
use folio_shared::types::{DocumentId, EmployeeId};
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::approval::ApprovalInstance;
use super::types::{ApprovalState, Decision, Role, Workflow, WorkflowStep};
use crate::documents::DocumentKind;

fn role() -> impl Strategy<Value = Role> {
    prop_oneof![
        Just(Role::Approver),
        Just(Role::Accountant),
        Just(Role::Controller),
    ]
}

/// Strategy for a workflow of 1-5 steps with random roles, required flags and thresholds.
fn workflow() -> impl Strategy<Value = Workflow> {
    prop::collection::vec(
        (role(), any::<bool>(), prop::option::of(0i64..2000)),
        1..5,
    )
    .prop_map(|steps| {
        let steps = steps
            .into_iter()
            .enumerate()
            .map(|(i, (role, required, threshold))| WorkflowStep {
                name: format!("step-{i}"),
                approver_role: role,
                required,
                skip_below: threshold.map(Decimal::from),
            })
            .collect();
        Workflow::new("prop", DocumentKind::Invoice, steps).unwrap()
    })
}

/// Strategy for decision attempts: (step index, role, approve?).
fn attempts() -> impl Strategy<Value = Vec<(usize, Role, bool)>> {
    prop::collection::vec((0usize..6, role(), prop::bool::weighted(0.9)), 0..30)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// *For any* workflow and any sequence of decision attempts, the instance is
    /// Approved only if every required step carries an approval, and a refused
    /// attempt leaves the instance unchanged.
    #[test]
    fn prop_approved_implies_required_steps_approved(
        wf in workflow(),
        amount in 0i64..3000,
        tries in attempts(),
    ) {
        let mut instance = ApprovalInstance::start(
            &wf,
            DocumentId::new(),
            Decimal::from(amount),
            EmployeeId::new(),
            Utc::now(),
        )
        .unwrap();

        for (step, role, approve) in tries {
            let before = instance.clone();
            let decision =
                if approve { Decision::Approve } else { Decision::Reject { reason: None } };
            if instance.decide(step, decision, EmployeeId::new(), Some(role), Utc::now()).is_err() {
                prop_assert_eq!(&instance, &before);
            }
            if instance.state == ApprovalState::Approved {
                prop_assert!(instance.all_required_approved());
            }
        }
    }
}
