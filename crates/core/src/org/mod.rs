//! Departments and their managers.

use std::collections::HashMap;

use folio_shared::types::{DepartmentId, EmployeeId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::ErrorKind;

/// Errors raised by department operations.
#[derive(Debug, Error)]
pub enum OrgError {
    /// Department name is blank.
    #[error("Department name cannot be empty")]
    EmptyName,

    /// Department name already used.
    #[error("Department already exists: {0}")]
    DuplicateName(String),

    /// Department not found.
    #[error("Department not found: {0}")]
    DepartmentNotFound(DepartmentId),

    /// Employee not known to the role directory.
    #[error("Unknown employee: {0}")]
    UnknownEmployee(EmployeeId),
}

impl OrgError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyName => "EMPTY_DEPARTMENT_NAME",
            Self::DuplicateName(_) => "DUPLICATE_DEPARTMENT",
            Self::DepartmentNotFound(_) => "DEPARTMENT_NOT_FOUND",
            Self::UnknownEmployee(_) => "UNKNOWN_EMPLOYEE",
        }
    }

    /// Returns the error classification.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::EmptyName | Self::DuplicateName(_) | Self::UnknownEmployee(_) => {
                ErrorKind::Validation
            }
            Self::DepartmentNotFound(_) => ErrorKind::NotFound,
        }
    }
}

/// A department.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
    /// Unique identifier.
    pub id: DepartmentId,
    /// Department name, unique.
    pub name: String,
    /// Current manager.
    pub manager_id: Option<EmployeeId>,
}

/// All departments.
#[derive(Debug, Clone, Default)]
pub struct Departments {
    departments: HashMap<DepartmentId, Department>,
}

impl Departments {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up a department.
    pub fn get(&self, id: DepartmentId) -> Result<&Department, OrgError> {
        self.departments
            .get(&id)
            .ok_or(OrgError::DepartmentNotFound(id))
    }

    /// Validates a new department.
    pub fn prepare_department(&self, name: &str) -> Result<Department, OrgError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(OrgError::EmptyName);
        }
        if self
            .departments
            .values()
            .any(|d| d.name.eq_ignore_ascii_case(name))
        {
            return Err(OrgError::DuplicateName(name.to_string()));
        }
        Ok(Department {
            id: DepartmentId::new(),
            name: name.to_string(),
            manager_id: None,
        })
    }

    /// Returns the department as it would look with a new manager.
    pub fn prepare_manager(
        &self,
        id: DepartmentId,
        manager_id: EmployeeId,
    ) -> Result<Department, OrgError> {
        let mut department = self.get(id)?.clone();
        department.manager_id = Some(manager_id);
        Ok(department)
    }

    /// Stores a department obtained from a `prepare_*` method.
    pub fn apply(&mut self, department: Department) {
        self.departments.insert(department.id, department);
    }
}
