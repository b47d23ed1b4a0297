//! Department operations.

use chrono::Utc;
use folio_core::audit::{AuditAction, NewAuditRecord};
use folio_core::org::{Department, OrgError};
use folio_shared::types::{DepartmentId, EmployeeId};
use tracing::info;

use crate::engine::Engine;
use crate::error::EngineResult;
use crate::locks;

const TABLE: &str = "departments";

impl Engine {
    /// Creates a department without a manager.
    pub async fn create_department(
        &self,
        name: &str,
        actor: EmployeeId,
    ) -> EngineResult<Department> {
        let mut departments =
            locks::lock(&self.departments, self.lock_timeout(), "departments").await?;
        let department = departments.prepare_department(name)?;
        self.record(vec![
            NewAuditRecord::new(TABLE, department.id, AuditAction::Create, actor, Utc::now())
                .after(&department)?,
        ])?;
        departments.apply(department.clone());
        info!(department_id = %department.id, name = %department.name, "Department created");
        Ok(department)
    }

    /// Makes an employee the manager of a department.
    ///
    /// The employee must be known to the role directory.
    pub async fn assign_manager(
        &self,
        department_id: DepartmentId,
        manager_id: EmployeeId,
        actor: EmployeeId,
    ) -> EngineResult<Department> {
        if self.roles.role_of(manager_id).is_none() {
            return Err(OrgError::UnknownEmployee(manager_id).into());
        }
        let mut departments =
            locks::lock(&self.departments, self.lock_timeout(), "departments").await?;
        let before = departments.get(department_id)?.clone();
        let department = departments.prepare_manager(department_id, manager_id)?;
        self.record(vec![
            NewAuditRecord::new(TABLE, department_id, AuditAction::Update, actor, Utc::now())
                .before(&before)?
                .after(&department)?,
        ])?;
        departments.apply(department.clone());
        info!(
            department_id = %department_id,
            manager_id = %manager_id,
            "Department manager assigned"
        );
        Ok(department)
    }

    /// Looks up a department.
    pub async fn department(&self, department_id: DepartmentId) -> EngineResult<Department> {
        let departments = locks::lock(&self.departments, self.lock_timeout(), "departments").await?;
        Ok(departments.get(department_id)?.clone())
    }
}
