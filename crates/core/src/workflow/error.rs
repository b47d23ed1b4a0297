//! Workflow error types for approval instances.

use folio_shared::types::{ApprovalInstanceId, DocumentId, EmployeeId, WorkflowId};
use thiserror::Error;

use super::types::{ApprovalState, Role};
use crate::documents::DocumentKind;
use crate::error::ErrorKind;

/// Errors that can occur during workflow operations.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// Workflow has no steps.
    #[error("Workflow must have at least one step")]
    EmptyWorkflow,

    /// Decision submitted for a step other than the current one.
    #[error("Wrong step: expected {expected:?}, got {got}")]
    WrongStep {
        /// The step awaiting a decision, if any.
        expected: Option<usize>,
        /// The step named in the request.
        got: usize,
    },

    /// Step already has a recorded decision.
    #[error("Step {step} has already been decided")]
    StepAlreadyDecided {
        /// The step index.
        step: usize,
    },

    /// Instance is no longer pending.
    #[error("Approval instance {instance_id} is {state}")]
    InstanceClosed {
        /// The instance.
        instance_id: ApprovalInstanceId,
        /// Its terminal state.
        state: ApprovalState,
    },

    /// Actor does not hold the step's role.
    #[error("Employee {actor} with role {actual:?} cannot decide a step requiring {required}")]
    UnauthorizedRole {
        /// Who tried to decide.
        actor: EmployeeId,
        /// Role the step requires.
        required: Role,
        /// Role the actor holds, if known.
        actual: Option<Role>,
    },

    /// Instance has not reached Approved.
    #[error("Approval instance {instance_id} is not approved ({state})")]
    NotApproved {
        /// The instance.
        instance_id: ApprovalInstanceId,
        /// Its current state.
        state: ApprovalState,
    },

    /// Workflow is for a different document kind.
    #[error("Workflow approves {workflow} documents, not {document}")]
    KindMismatch {
        /// Kind the workflow handles.
        workflow: DocumentKind,
        /// Kind of the document.
        document: DocumentKind,
    },

    /// Instance approves a different document.
    #[error("Approval instance {instance_id} does not belong to document {document_id}")]
    DocumentMismatch {
        /// The instance.
        instance_id: ApprovalInstanceId,
        /// The document it was presented for.
        document_id: DocumentId,
    },

    /// Workflow not found.
    #[error("Workflow not found: {0}")]
    WorkflowNotFound(WorkflowId),

    /// Approval instance not found.
    #[error("Approval instance not found: {0}")]
    InstanceNotFound(ApprovalInstanceId),
}

impl WorkflowError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyWorkflow => "EMPTY_WORKFLOW",
            Self::WrongStep { .. } => "WRONG_STEP",
            Self::StepAlreadyDecided { .. } => "STEP_ALREADY_DECIDED",
            Self::InstanceClosed { .. } => "INSTANCE_CLOSED",
            Self::UnauthorizedRole { .. } => "UNAUTHORIZED_ROLE",
            Self::NotApproved { .. } => "NOT_APPROVED",
            Self::KindMismatch { .. } => "KIND_MISMATCH",
            Self::DocumentMismatch { .. } => "DOCUMENT_MISMATCH",
            Self::WorkflowNotFound(_) => "WORKFLOW_NOT_FOUND",
            Self::InstanceNotFound(_) => "APPROVAL_INSTANCE_NOT_FOUND",
        }
    }

    /// Returns the error classification.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::EmptyWorkflow | Self::KindMismatch { .. } | Self::DocumentMismatch { .. } => {
                ErrorKind::Validation
            }
            Self::WrongStep { .. }
            | Self::StepAlreadyDecided { .. }
            | Self::InstanceClosed { .. }
            | Self::UnauthorizedRole { .. }
            | Self::NotApproved { .. } => ErrorKind::StateConflict,
            Self::WorkflowNotFound(_) | Self::InstanceNotFound(_) => ErrorKind::NotFound,
        }
    }

    /// Returns true if the actor lacked permission.
    #[must_use]
    pub const fn is_forbidden(&self) -> bool {
        matches!(self, Self::UnauthorizedRole { .. })
    }
}
