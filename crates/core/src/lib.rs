//! Core business logic for Folio.
//!
//! This crate contains pure business logic with ZERO storage or runtime dependencies.
//! All domain types, validation rules, and calculations live here; the engine crate
//! owns locking, audit sequencing and persistence.
//!
//! # Modules
//!
//! - `accounts` - Chart of accounts and the account tree
//! - `fiscal` - Fiscal years, periods and the close/reopen state machine
//! - `ledger` - Double-entry postings, the journal book and balances
//! - `documents` - Invoices, bills, payments and their lifecycle
//! - `workflow` - Multi-step approval workflows
//! - `audit` - Audit records and the audit sink seam
//! - `inventory` - Stock movements linked to documents
//! - `org` - Departments and their managers

pub mod accounts;
pub mod audit;
pub mod documents;
pub mod error;
pub mod fiscal;
pub mod inventory;
pub mod ledger;
pub mod org;
pub mod workflow;

pub use error::ErrorKind;
