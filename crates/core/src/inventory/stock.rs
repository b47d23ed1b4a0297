//! Stock movement types and the movement log.

use chrono::{DateTime, NaiveDate, Utc};
use folio_shared::types::{DocumentId, EmployeeId, ProductId, StockMovementId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::InventoryError;
use crate::documents::DocumentKind;

/// What caused a stock movement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RelatedDocument {
    /// Goods shipped against an invoice.
    Invoice {
        /// The invoice.
        document_id: DocumentId,
    },
    /// Goods received against a bill.
    Bill {
        /// The bill.
        document_id: DocumentId,
    },
    /// Manual correction (count, breakage).
    Adjustment {
        /// Why the stock was adjusted.
        reason: String,
    },
}

impl RelatedDocument {
    /// The linked document and the kind it must have, if any.
    #[must_use]
    pub fn document(&self) -> Option<(DocumentId, DocumentKind)> {
        match self {
            Self::Invoice { document_id } => Some((*document_id, DocumentKind::Invoice)),
            Self::Bill { document_id } => Some((*document_id, DocumentKind::Bill)),
            Self::Adjustment { .. } => None,
        }
    }
}

/// Input for recording a movement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewStockMovement {
    /// The product moved.
    pub product_id: ProductId,
    /// Signed quantity: positive in, negative out.
    pub quantity: Decimal,
    /// Movement date.
    pub movement_date: NaiveDate,
    /// What caused it.
    pub related: RelatedDocument,
}

/// A recorded stock movement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockMovement {
    /// Unique identifier.
    pub id: StockMovementId,
    /// The product moved.
    pub product_id: ProductId,
    /// Signed quantity.
    pub quantity: Decimal,
    /// Movement date.
    pub movement_date: NaiveDate,
    /// What caused it.
    pub related: RelatedDocument,
    /// Who recorded it.
    pub recorded_by: EmployeeId,
    /// When it was recorded.
    pub recorded_at: DateTime<Utc>,
}

/// Movement log; on-hand quantities are summed from it on read.
#[derive(Debug, Clone, Default)]
pub struct StockLedger {
    movements: Vec<StockMovement>,
}

impl StockLedger {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// On-hand quantity of a product.
    ///
    /// Every stored movement kept the running quantity within range, so the
    /// sum in recording order cannot overflow.
    #[must_use]
    pub fn on_hand(&self, product_id: ProductId) -> Decimal {
        self.movements
            .iter()
            .filter(|m| m.product_id == product_id)
            .map(|m| m.quantity)
            .sum()
    }

    /// Movements of a product in recording order.
    #[must_use]
    pub fn movements_of(&self, product_id: ProductId) -> Vec<&StockMovement> {
        self.movements
            .iter()
            .filter(|m| m.product_id == product_id)
            .collect()
    }

    /// Validates a movement and returns it as it would be stored.
    pub fn prepare(
        &self,
        input: NewStockMovement,
        recorded_by: EmployeeId,
        recorded_at: DateTime<Utc>,
    ) -> Result<StockMovement, InventoryError> {
        if input.quantity.is_zero() {
            return Err(InventoryError::ZeroQuantity);
        }
        if let RelatedDocument::Adjustment { reason } = &input.related
            && reason.trim().is_empty()
        {
            return Err(InventoryError::MissingReason);
        }
        let on_hand = self.on_hand(input.product_id);
        let after = on_hand
            .checked_add(input.quantity)
            .ok_or(InventoryError::QuantityOutOfRange {
                product_id: input.product_id,
            })?;
        if after < Decimal::ZERO {
            return Err(InventoryError::InsufficientStock {
                product_id: input.product_id,
                on_hand,
                requested: -input.quantity,
            });
        }
        Ok(StockMovement {
            id: StockMovementId::new(),
            product_id: input.product_id,
            quantity: input.quantity,
            movement_date: input.movement_date,
            related: input.related,
            recorded_by,
            recorded_at,
        })
    }

    /// Stores a movement obtained from `prepare`.
    pub fn apply(&mut self, movement: StockMovement) {
        self.movements.push(movement);
    }
}
