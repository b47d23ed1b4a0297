//! Chart of accounts.
//!
//! Accounts form a forest through their optional parent link. The registry
//! keeps account numbers unique, refuses dangling parents and cycles, and
//! answers the "may this account take a posting" question for the ledger.

pub mod error;
pub mod registry;
pub mod types;

#[cfg(test)]
mod registry_props;

pub use error::{AccountError, ParentProblem};
pub use registry::AccountRegistry;
pub use types::{Account, AccountType, BalanceType, NewAccount};
