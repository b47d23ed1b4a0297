//! Audit trail.
//!
//! Every state-changing operation appends one record per touched row before
//! its change becomes visible. If the sink refuses, the operation aborts.

pub mod error;
pub mod record;

pub use error::AuditError;
pub use record::{AuditAction, AuditRecord, AuditSink, NewAuditRecord};
