//! Directory collaborators backed by in-process maps.
//!
//! Employees and parties are owned by other systems; these are the
//! implementations used by the seeder and the tests.

use dashmap::{DashMap, DashSet};
use folio_core::documents::PartyDirectory;
use folio_core::workflow::{Role, RoleDirectory};
use folio_shared::types::{EmployeeId, PartyId};

/// Role lookup from a fixed table.
#[derive(Debug, Default)]
pub struct StaticRoleDirectory {
    roles: DashMap<EmployeeId, Role>,
}

impl StaticRoleDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an employee with a role.
    #[must_use]
    pub fn with(self, employee: EmployeeId, role: Role) -> Self {
        self.roles.insert(employee, role);
        self
    }

    /// Sets or replaces an employee's role.
    pub fn assign(&self, employee: EmployeeId, role: Role) {
        self.roles.insert(employee, role);
    }
}

impl RoleDirectory for StaticRoleDirectory {
    fn role_of(&self, employee: EmployeeId) -> Option<Role> {
        self.roles.get(&employee).map(|entry| *entry.value())
    }
}

/// Customer and vendor existence from a fixed set.
#[derive(Debug, Default)]
pub struct StaticPartyDirectory {
    parties: DashSet<PartyId>,
}

impl StaticPartyDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a party.
    #[must_use]
    pub fn with(self, party: PartyId) -> Self {
        self.parties.insert(party);
        self
    }

    /// Registers a party.
    pub fn register(&self, party: PartyId) {
        self.parties.insert(party);
    }
}

impl PartyDirectory for StaticPartyDirectory {
    fn exists(&self, party_id: PartyId) -> bool {
        self.parties.contains(&party_id)
    }
}
