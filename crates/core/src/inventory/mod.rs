//! Stock movements.
//!
//! Each movement names the document that caused it through a typed link, so
//! a movement can point at an invoice, a bill, or a manual adjustment but
//! never at an ambiguous id.

pub mod error;
pub mod stock;

pub use error::InventoryError;
pub use stock::{NewStockMovement, RelatedDocument, StockLedger, StockMovement};
