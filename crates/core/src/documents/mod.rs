//! Invoices, bills and the payments applied to them.
//!
//! An invoice (money owed to us) and a bill (money we owe) share one
//! lifecycle: drafted, approved, issued/received with a ledger posting,
//! paid down by payment applications, possibly cancelled while unpaid.
//! The outstanding balance and the overdue flag are derived on read.

pub mod error;
pub mod lifecycle;
pub mod types;

#[cfg(test)]
mod lifecycle_props;

pub use error::DocumentError;
pub use types::{
    DocumentKind, DocumentLine, DocumentStatus, FinancialDocument, NewDocument, NewPayment,
    PartyDirectory, Payment, PaymentApplication,
};
