//! Folio engine: the stateful, concurrency-safe side of the ledger.
//!
//! Composes the pure logic in `folio-core` behind bounded locks:
//!
//! - Postings validate against the chart and calendar and commit atomically
//! - Period close waits for in-flight postings and then blocks new ones
//! - Every mutation appends its audit records before it becomes visible
//! - Documents, payments and approvals each serialize on their own lock
//!
//! # Example
//!
//! ```ignore
//! let engine = Engine::builder(config.engine).build();
//! engine.create_fiscal_year("FY2026", start, end, admin).await?;
//! engine.post(request).await?;
//! ```

mod accounts;
mod approvals;
pub mod audit_log;
pub mod directory;
mod documents;
mod engine;
pub mod error;
mod inventory;
mod locks;
mod org;
mod periods;
mod posting;

pub use audit_log::MemoryAuditLog;
pub use directory::{StaticPartyDirectory, StaticRoleDirectory};
pub use documents::{IssueAccounts, posting_reference};
pub use engine::{Engine, EngineBuilder};
pub use error::{EngineError, EngineResult};
