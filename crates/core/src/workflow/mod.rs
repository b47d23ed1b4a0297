//! Multi-step approval workflows.
//!
//! A workflow is an ordered list of steps, each naming the role allowed to
//! decide it. Starting a workflow for a document creates an approval
//! instance that walks the steps in order. Only an instance that reached
//! Approved lets its document be posted.
//!
//! # Modules
//!
//! - `types` - Roles, steps, decisions and instance state
//! - `error` - Workflow-specific error types
//! - `approval` - The approval instance state machine

pub mod approval;
pub mod error;
pub mod types;

#[cfg(test)]
mod approval_props;

pub use approval::{ApprovalInstance, RoleDirectory};
pub use error::WorkflowError;
pub use types::{ApprovalState, Decision, Role, StepDecision, Workflow, WorkflowStep};
