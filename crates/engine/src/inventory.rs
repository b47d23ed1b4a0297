//! Stock movement operations.

use chrono::Utc;
use folio_core::audit::{AuditAction, NewAuditRecord};
use folio_core::inventory::{InventoryError, NewStockMovement, StockMovement};
use folio_shared::types::{EmployeeId, ProductId};
use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::engine::Engine;
use crate::error::EngineResult;
use crate::locks;

const TABLE: &str = "stock_movements";

impl Engine {
    /// Records a stock movement.
    ///
    /// A movement linked to an invoice or bill requires that document to
    /// exist with the matching kind.
    pub async fn record_stock_movement(
        &self,
        input: NewStockMovement,
        actor: EmployeeId,
    ) -> EngineResult<StockMovement> {
        if let Some((document_id, expected)) = input.related.document() {
            let document = self.document(document_id).await?;
            if document.kind != expected {
                return Err(InventoryError::RelatedKindMismatch {
                    document_id,
                    expected,
                    actual: document.kind,
                }
                .into());
            }
        }

        let mut stock = locks::lock(&self.stock, self.lock_timeout(), "stock").await?;
        let movement = stock.prepare(input, actor, Utc::now()).inspect_err(|e| {
            warn!(error = %e, "Stock movement rejected");
        })?;
        self.record(vec![
            NewAuditRecord::new(TABLE, movement.id, AuditAction::Create, actor, Utc::now())
                .after(&movement)?,
        ])?;
        stock.apply(movement.clone());
        info!(
            movement_id = %movement.id,
            product_id = %movement.product_id,
            quantity = %movement.quantity,
            "Stock movement recorded"
        );
        Ok(movement)
    }

    /// Quantity on hand, summed from the product's movements.
    pub async fn on_hand(&self, product_id: ProductId) -> EngineResult<Decimal> {
        let stock = locks::lock(&self.stock, self.lock_timeout(), "stock").await?;
        Ok(stock.on_hand(product_id))
    }

    /// Movements of one product in recording order.
    pub async fn movements_of(&self, product_id: ProductId) -> EngineResult<Vec<StockMovement>> {
        let stock = locks::lock(&self.stock, self.lock_timeout(), "stock").await?;
        Ok(stock.movements_of(product_id).into_iter().cloned().collect())
    }
}
