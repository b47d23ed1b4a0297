//! Workflow domain types.

use chrono::{DateTime, Utc};
use folio_shared::types::{EmployeeId, WorkflowId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::WorkflowError;
use crate::documents::DocumentKind;

/// Employee role used to gate approval steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Can only view records.
    Viewer,
    /// Can create and submit documents.
    Submitter,
    /// Line manager sign-off.
    Approver,
    /// Accounting sign-off.
    Accountant,
    /// Finance controller sign-off.
    Controller,
    /// Full access.
    Admin,
}

impl Role {
    /// Parse a role from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "viewer" => Some(Self::Viewer),
            "submitter" => Some(Self::Submitter),
            "approver" => Some(Self::Approver),
            "accountant" => Some(Self::Accountant),
            "controller" => Some(Self::Controller),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }

    /// Returns the string representation of the role.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Viewer => "viewer",
            Self::Submitter => "submitter",
            Self::Approver => "approver",
            Self::Accountant => "accountant",
            Self::Controller => "controller",
            Self::Admin => "admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One step of a workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowStep {
    /// Step label (e.g. "Manager review").
    pub name: String,
    /// Role an actor must hold to decide this step.
    pub approver_role: Role,
    /// Required steps must be approved; optional ones may be skipped.
    pub required: bool,
    /// Optional steps are skipped automatically for amounts below this.
    pub skip_below: Option<Decimal>,
}

impl WorkflowStep {
    /// A required step.
    pub fn required(name: impl Into<String>, approver_role: Role) -> Self {
        Self {
            name: name.into(),
            approver_role,
            required: true,
            skip_below: None,
        }
    }

    /// An optional step, skipped automatically below `threshold` when given.
    pub fn optional(
        name: impl Into<String>,
        approver_role: Role,
        threshold: Option<Decimal>,
    ) -> Self {
        Self {
            name: name.into(),
            approver_role,
            required: false,
            skip_below: threshold,
        }
    }

    /// Whether this step is skipped for a document of `amount`.
    #[must_use]
    pub fn auto_skips(&self, amount: Decimal) -> bool {
        !self.required && self.skip_below.is_some_and(|threshold| amount < threshold)
    }
}

/// An approval workflow for one kind of document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workflow {
    /// Unique identifier.
    pub id: WorkflowId,
    /// Workflow name.
    pub name: String,
    /// Documents this workflow approves.
    pub document_kind: DocumentKind,
    /// Ordered steps.
    pub steps: Vec<WorkflowStep>,
}

impl Workflow {
    /// Creates a workflow; at least one step is required.
    pub fn new(
        name: impl Into<String>,
        document_kind: DocumentKind,
        steps: Vec<WorkflowStep>,
    ) -> Result<Self, WorkflowError> {
        if steps.is_empty() {
            return Err(WorkflowError::EmptyWorkflow);
        }
        Ok(Self {
            id: WorkflowId::new(),
            name: name.into(),
            document_kind,
            steps,
        })
    }
}

/// Decision submitted for a step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    /// Approve the step.
    Approve,
    /// Reject the step, ending the instance.
    Reject {
        /// Optional explanation.
        reason: Option<String>,
    },
}

/// Recorded outcome of a step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum StepDecision {
    /// Approved by an actor.
    Approved {
        /// Who approved.
        by: EmployeeId,
        /// When.
        at: DateTime<Utc>,
    },
    /// Rejected by an actor.
    Rejected {
        /// Who rejected.
        by: EmployeeId,
        /// When.
        at: DateTime<Utc>,
        /// Optional explanation.
        reason: Option<String>,
    },
    /// Optional step skipped.
    Skipped,
}

/// State of an approval instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ApprovalState {
    /// Waiting for a decision on `step` (0-based).
    Pending {
        /// Index of the step awaiting a decision.
        step: usize,
    },
    /// Every required step approved.
    Approved,
    /// A step was rejected.
    Rejected {
        /// Index of the rejected step.
        step: usize,
    },
}

impl ApprovalState {
    /// True once Approved or Rejected.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending { .. })
    }
}

impl std::fmt::Display for ApprovalState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending { step } => write!(f, "pending at step {step}"),
            Self::Approved => f.write_str("approved"),
            Self::Rejected { step } => write!(f, "rejected at step {step}"),
        }
    }
}
