//! Approval instance state machine.
//!
//! ```text
//! Pending{0} --approve--> Pending{next} ... --approve last required--> Approved
//!      \--reject--> Rejected{step}
//! ```
//!
//! Optional steps whose threshold is not met are recorded as Skipped as the
//! instance advances; once no required step remains, it is Approved.

use chrono::{DateTime, Utc};
use folio_shared::types::{ApprovalInstanceId, DocumentId, EmployeeId, WorkflowId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::WorkflowError;
use super::types::{ApprovalState, Decision, Role, StepDecision, Workflow, WorkflowStep};

/// Employee roles live outside the engine.
pub trait RoleDirectory: Send + Sync {
    /// The role an employee holds, or `None` if unknown.
    fn role_of(&self, employee: EmployeeId) -> Option<Role>;
}

/// A running approval for one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalInstance {
    /// Unique identifier.
    pub id: ApprovalInstanceId,
    /// Workflow this instance runs.
    pub workflow_id: WorkflowId,
    /// Document being approved.
    pub document_id: DocumentId,
    /// Document total when the instance started; drives auto-skips.
    pub amount: Decimal,
    /// Steps copied from the workflow at start.
    pub steps: Vec<WorkflowStep>,
    /// One slot per step.
    pub decisions: Vec<Option<StepDecision>>,
    /// Current state.
    pub state: ApprovalState,
    /// Who started the instance.
    pub started_by: EmployeeId,
    /// When it started.
    pub started_at: DateTime<Utc>,
}

impl ApprovalInstance {
    /// Starts an instance, skipping any leading optional steps below threshold.
    pub fn start(
        workflow: &Workflow,
        document_id: DocumentId,
        amount: Decimal,
        started_by: EmployeeId,
        started_at: DateTime<Utc>,
    ) -> Result<Self, WorkflowError> {
        if workflow.steps.is_empty() {
            return Err(WorkflowError::EmptyWorkflow);
        }
        let mut instance = Self {
            id: ApprovalInstanceId::new(),
            workflow_id: workflow.id,
            document_id,
            amount,
            steps: workflow.steps.clone(),
            decisions: vec![None; workflow.steps.len()],
            state: ApprovalState::Pending { step: 0 },
            started_by,
            started_at,
        };
        instance.advance(0);
        Ok(instance)
    }

    /// Index of the step awaiting a decision, if pending.
    #[must_use]
    pub const fn current_step(&self) -> Option<usize> {
        match self.state {
            ApprovalState::Pending { step } => Some(step),
            _ => None,
        }
    }

    /// Records a decision on `step`.
    ///
    /// The step must be the current one and `actor_role` must equal the
    /// step's approver role. On failure nothing changes.
    pub fn decide(
        &mut self,
        step: usize,
        decision: Decision,
        actor: EmployeeId,
        actor_role: Option<Role>,
        at: DateTime<Utc>,
    ) -> Result<ApprovalState, WorkflowError> {
        let Some(slot) = self.decisions.get(step) else {
            return Err(WorkflowError::WrongStep {
                expected: self.current_step(),
                got: step,
            });
        };
        if slot.is_some() {
            return Err(WorkflowError::StepAlreadyDecided { step });
        }
        if self.state.is_terminal() {
            return Err(WorkflowError::InstanceClosed {
                instance_id: self.id,
                state: self.state,
            });
        }
        if self.current_step() != Some(step) {
            return Err(WorkflowError::WrongStep {
                expected: self.current_step(),
                got: step,
            });
        }
        let required = self.steps[step].approver_role;
        if actor_role != Some(required) {
            return Err(WorkflowError::UnauthorizedRole {
                actor,
                required,
                actual: actor_role,
            });
        }

        match decision {
            Decision::Approve => {
                self.decisions[step] = Some(StepDecision::Approved { by: actor, at });
                self.advance(step + 1);
            }
            Decision::Reject { reason } => {
                self.decisions[step] = Some(StepDecision::Rejected {
                    by: actor,
                    at,
                    reason,
                });
                self.state = ApprovalState::Rejected { step };
            }
        }
        Ok(self.state)
    }

    /// Fails unless the instance is Approved.
    pub fn ensure_approved(&self) -> Result<(), WorkflowError> {
        if self.state == ApprovalState::Approved {
            Ok(())
        } else {
            Err(WorkflowError::NotApproved {
                instance_id: self.id,
                state: self.state,
            })
        }
    }

    /// True when every required step carries an approval.
    #[must_use]
    pub fn all_required_approved(&self) -> bool {
        self.steps
            .iter()
            .zip(&self.decisions)
            .filter(|(step, _)| step.required)
            .all(|(_, decision)| matches!(decision, Some(StepDecision::Approved { .. })))
    }

    /// The employee who approved the latest approved step.
    #[must_use]
    pub fn last_approver(&self) -> Option<EmployeeId> {
        self.decisions.iter().rev().find_map(|d| match d {
            Some(StepDecision::Approved { by, .. }) => Some(*by),
            _ => None,
        })
    }

    fn advance(&mut self, from: usize) {
        let mut index = from;
        loop {
            if !self.steps.iter().skip(index).any(|s| s.required) {
                for slot in self.decisions.iter_mut().skip(index) {
                    if slot.is_none() {
                        *slot = Some(StepDecision::Skipped);
                    }
                }
                self.state = ApprovalState::Approved;
                return;
            }
            if self.steps[index].auto_skips(self.amount) {
                self.decisions[index] = Some(StepDecision::Skipped);
                index += 1;
                continue;
            }
            self.state = ApprovalState::Pending { step: index };
            return;
        }
    }
}
