//! Inventory errors.

use folio_shared::types::{DocumentId, ProductId};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::documents::DocumentKind;
use crate::error::ErrorKind;

/// Errors raised by stock movements.
#[derive(Debug, Error)]
pub enum InventoryError {
    /// Movement quantity is zero.
    #[error("Stock movement quantity cannot be zero")]
    ZeroQuantity,

    /// Adjustment reason is blank.
    #[error("Stock adjustment requires a reason")]
    MissingReason,

    /// Movement would take on-hand quantity below zero.
    #[error(
        "Insufficient stock for product {product_id}: on hand {on_hand}, requested {requested}"
    )]
    InsufficientStock {
        /// The product.
        product_id: ProductId,
        /// Current on-hand quantity.
        on_hand: Decimal,
        /// Quantity requested out.
        requested: Decimal,
    },

    /// Movement would take on-hand quantity past the range of `Decimal`.
    #[error("Stock for product {product_id} would exceed the supported range")]
    QuantityOutOfRange {
        /// The product.
        product_id: ProductId,
    },

    /// Linked document is of a different kind than the link claims.
    #[error("Document {document_id} is a {actual}, not a {expected}")]
    RelatedKindMismatch {
        /// The document.
        document_id: DocumentId,
        /// Kind named by the link.
        expected: DocumentKind,
        /// Kind of the stored document.
        actual: DocumentKind,
    },
}

impl InventoryError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::ZeroQuantity => "ZERO_QUANTITY",
            Self::MissingReason => "MISSING_REASON",
            Self::InsufficientStock { .. } => "INSUFFICIENT_STOCK",
            Self::QuantityOutOfRange { .. } => "QUANTITY_OUT_OF_RANGE",
            Self::RelatedKindMismatch { .. } => "RELATED_KIND_MISMATCH",
        }
    }

    /// Returns the error classification.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::ZeroQuantity
            | Self::MissingReason
            | Self::QuantityOutOfRange { .. }
            | Self::RelatedKindMismatch { .. } => ErrorKind::Validation,
            Self::InsufficientStock { .. } => ErrorKind::StateConflict,
        }
    }
}
