//! Approval workflow operations.

use std::sync::Arc;

use chrono::Utc;
use folio_core::audit::{AuditAction, NewAuditRecord};
use folio_core::documents::DocumentKind;
use folio_core::workflow::{
    ApprovalInstance, ApprovalState, Decision, Workflow, WorkflowError, WorkflowStep,
};
use folio_shared::types::{ApprovalInstanceId, DocumentId, EmployeeId, WorkflowId};
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::engine::Engine;
use crate::error::EngineResult;
use crate::locks;

const INSTANCES: &str = "approval_instances";

impl Engine {
    /// Registers an approval workflow for one document kind.
    pub async fn register_workflow(
        &self,
        name: &str,
        document_kind: DocumentKind,
        steps: Vec<WorkflowStep>,
        actor: EmployeeId,
    ) -> EngineResult<Workflow> {
        let workflow = Workflow::new(name, document_kind, steps)?;
        let mut workflows = locks::write(&self.workflows, self.lock_timeout(), "workflows").await?;
        self.record(vec![
            NewAuditRecord::new("workflows", workflow.id, AuditAction::Create, actor, Utc::now())
                .after(&workflow)?,
        ])?;
        workflows.insert(workflow.id, workflow.clone());
        info!(
            workflow_id = %workflow.id,
            name = %workflow.name,
            kind = %workflow.document_kind,
            steps = workflow.steps.len(),
            "Workflow registered"
        );
        Ok(workflow)
    }

    /// Starts approving a document with a workflow for its kind.
    ///
    /// The document total drives optional-step thresholds; if every step is
    /// skipped the instance starts Approved.
    pub async fn start_approval(
        &self,
        workflow_id: WorkflowId,
        document_id: DocumentId,
        actor: EmployeeId,
    ) -> EngineResult<ApprovalInstance> {
        let workflow = {
            let workflows = locks::read(&self.workflows, self.lock_timeout(), "workflows").await?;
            workflows
                .get(&workflow_id)
                .cloned()
                .ok_or(WorkflowError::WorkflowNotFound(workflow_id))?
        };
        let document = self.document(document_id).await?;
        if workflow.document_kind != document.kind {
            return Err(WorkflowError::KindMismatch {
                workflow: workflow.document_kind,
                document: document.kind,
            }
            .into());
        }

        let amount = document.total_amount();
        let instance = ApprovalInstance::start(&workflow, document_id, amount, actor, Utc::now())?;
        self.record(vec![
            NewAuditRecord::new(INSTANCES, instance.id, AuditAction::Create, actor, Utc::now())
                .after(&instance)?,
        ])?;
        self.approvals
            .insert(instance.id, Arc::new(Mutex::new(instance.clone())));
        info!(
            instance_id = %instance.id,
            document_id = %document_id,
            state = %instance.state,
            "Approval started"
        );
        Ok(instance)
    }

    /// Records a decision on the current step of an approval.
    ///
    /// The actor's role comes from the role directory and must equal the
    /// step's approver role.
    pub async fn decide(
        &self,
        instance_id: ApprovalInstanceId,
        step: usize,
        decision: Decision,
        actor: EmployeeId,
    ) -> EngineResult<ApprovalState> {
        let role = self.roles.role_of(actor);
        let handle = self.approval_handle(instance_id)?;
        let label = format!("approval {instance_id}");
        let mut instance = locks::lock_owned(handle, self.lock_timeout(), label).await?;

        let mut decided = instance.clone();
        let state = decided
            .decide(step, decision, actor, role, Utc::now())
            .inspect_err(|e| {
                warn!(
                    instance_id = %instance_id,
                    step,
                    actor = %actor,
                    error = %e,
                    "Decision rejected"
                );
            })?;
        self.record(vec![
            NewAuditRecord::new(INSTANCES, instance_id, AuditAction::Decide, actor, Utc::now())
                .before(&*instance)?
                .after(&decided)?,
        ])?;
        *instance = decided;
        info!(
            instance_id = %instance_id,
            step,
            actor = %actor,
            state = %state,
            "Approval step decided"
        );
        Ok(state)
    }

    /// An approval instance as stored.
    pub async fn approval(
        &self,
        instance_id: ApprovalInstanceId,
    ) -> EngineResult<ApprovalInstance> {
        let handle = self.approval_handle(instance_id)?;
        let label = format!("approval {instance_id}");
        let instance = locks::lock_owned(handle, self.lock_timeout(), label).await?;
        Ok(ApprovalInstance::clone(&instance))
    }
}
