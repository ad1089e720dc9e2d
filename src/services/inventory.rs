use crate::{
    db::DbPool,
    entities::product::{self, Entity as ProductEntity},
    errors::ServiceError,
    events::{Event, EventSender},
    models::ShortfallReason,
};
use sea_orm::sea_query::Expr;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;

/// One requested order line, pre-aggregated per product by the caller.
#[derive(Debug, Clone, Copy)]
pub struct LineRequirement {
    pub product_id: Uuid,
    pub quantity: i32,
}

/// A product the sufficiency check flagged for replenishment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ShortfallEntry {
    pub product_id: Uuid,
    pub sku: String,
    pub reason: ShortfallReason,
    /// Units needed to bring stock back to zero (insufficient stock) or to
    /// the minimum level (below minimum). Lead time is deliberately ignored.
    pub required_quantity: i32,
}

impl ShortfallEntry {
    /// Short human-readable explanation, embedded in production order notes.
    pub fn describe(&self) -> String {
        match self.reason {
            ShortfallReason::InsufficientStock => {
                format!("insufficient stock ({} units short)", self.required_quantity)
            }
            ShortfallReason::BelowMinimum => format!(
                "stock below minimum ({} units to restore threshold)",
                self.required_quantity
            ),
        }
    }
}

/// Evaluates one line against current stock.
///
/// Returns the shortfall reason and required quantity, or `None` when the
/// line can be filled without dipping under the minimum level.
pub(crate) fn evaluate_stock(
    on_hand: i32,
    minimum_stock_level: i32,
    quantity: i32,
) -> Option<(ShortfallReason, i32)> {
    let stock_after_order = on_hand - quantity;

    if stock_after_order < 0 {
        Some((ShortfallReason::InsufficientStock, -stock_after_order))
    } else if stock_after_order < minimum_stock_level {
        Some((
            ShortfallReason::BelowMinimum,
            minimum_stock_level - stock_after_order,
        ))
    } else {
        None
    }
}

/// Service for inventory levels and the order-intake sufficiency check
#[derive(Clone)]
pub struct InventoryService {
    db_pool: Arc<DbPool>,
    event_sender: EventSender,
}

impl InventoryService {
    /// Creates a new inventory service instance
    pub fn new(db_pool: Arc<DbPool>, event_sender: EventSender) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Checks whether the requested lines can be filled from stock.
    ///
    /// Every line must reference an existing product; unknown products fail
    /// the whole check with a validation error naming each missing id.
    /// Entries come back in input order, at most one per product (callers
    /// pre-aggregate quantities, enforced at the order boundary).
    #[instrument(skip(self, lines), fields(line_count = lines.len()))]
    pub async fn check_order_lines(
        &self,
        lines: &[LineRequirement],
    ) -> Result<Vec<ShortfallEntry>, ServiceError> {
        let db = &*self.db_pool;

        let ids: Vec<Uuid> = lines.iter().map(|line| line.product_id).collect();
        let products: HashMap<Uuid, product::Model> = ProductEntity::find()
            .filter(product::Column::Id.is_in(ids))
            .all(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .into_iter()
            .map(|model| (model.id, model))
            .collect();

        let unknown: Vec<String> = lines
            .iter()
            .filter(|line| !products.contains_key(&line.product_id))
            .map(|line| line.product_id.to_string())
            .collect();
        if !unknown.is_empty() {
            return Err(ServiceError::ValidationError(format!(
                "Order lines reference unknown products: {}",
                unknown.join(", ")
            )));
        }

        let mut shortfalls = Vec::new();
        for line in lines {
            let product = &products[&line.product_id];
            if let Some((reason, required_quantity)) =
                evaluate_stock(product.on_hand, product.minimum_stock_level, line.quantity)
            {
                info!(
                    product_id = %product.id,
                    sku = %product.sku,
                    reason = %reason,
                    required_quantity = required_quantity,
                    "Product flagged for replenishment"
                );
                shortfalls.push(ShortfallEntry {
                    product_id: product.id,
                    sku: product.sku.clone(),
                    reason,
                    required_quantity,
                });
            }
        }

        Ok(shortfalls)
    }

    /// Applies a signed stock adjustment to a product.
    #[instrument(skip(self), fields(product_id = %product_id, delta = delta))]
    pub async fn adjust_stock(
        &self,
        product_id: Uuid,
        delta: i32,
        reason: Option<String>,
    ) -> Result<product::Model, ServiceError> {
        let db = &*self.db_pool;

        let model = ProductEntity::find_by_id(product_id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| ServiceError::NotFound("Product not found".to_string()))?;

        let old_on_hand = model.on_hand;
        let new_on_hand = old_on_hand + delta;
        if new_on_hand < 0 {
            return Err(ServiceError::InvalidOperation(format!(
                "Adjustment of {} would take stock of {} below zero (on hand: {})",
                delta, model.sku, old_on_hand
            )));
        }

        let minimum_stock_level = model.minimum_stock_level;
        let mut active_model: product::ActiveModel = model.into();
        active_model.on_hand = Set(new_on_hand);

        let updated = active_model
            .update(db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        info!(
            product_id = %product_id,
            old_on_hand = old_on_hand,
            new_on_hand = new_on_hand,
            "Stock adjusted"
        );

        if let Err(e) = self
            .event_sender
            .send(Event::StockAdjusted {
                product_id,
                old_on_hand,
                new_on_hand,
                minimum_stock_level,
                reason: reason.unwrap_or_else(|| "manual_adjustment".to_string()),
            })
            .await
        {
            warn!(error = %e, product_id = %product_id, "Failed to send stock adjusted event");
        }

        Ok(updated)
    }

    /// Lists products currently under their minimum stock level.
    #[instrument(skip(self))]
    pub async fn low_stock(&self) -> Result<Vec<product::Model>, ServiceError> {
        let db = &*self.db_pool;

        ProductEntity::find()
            .filter(
                Expr::col(product::Column::OnHand)
                    .lt(Expr::col(product::Column::MinimumStockLevel)),
            )
            .order_by_asc(product::Column::Sku)
            .all(db)
            .await
            .map_err(ServiceError::DatabaseError)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    // Order alone exceeds stock: shortfall restores stock to exactly zero.
    #[case(10, 0, 15, Some((ShortfallReason::InsufficientStock, 5)))]
    // Fillable, but would leave stock under the minimum.
    #[case(50, 20, 40, Some((ShortfallReason::BelowMinimum, 10)))]
    // Plenty of stock left over.
    #[case(100, 20, 10, None)]
    // Landing exactly on the minimum is acceptable.
    #[case(60, 20, 40, None)]
    // Draining stock to zero with no minimum configured is acceptable.
    #[case(10, 0, 10, None)]
    // Whole order short by one unit.
    #[case(0, 0, 1, Some((ShortfallReason::InsufficientStock, 1)))]
    fn evaluate_stock_cases(
        #[case] on_hand: i32,
        #[case] minimum: i32,
        #[case] quantity: i32,
        #[case] expected: Option<(ShortfallReason, i32)>,
    ) {
        assert_eq!(evaluate_stock(on_hand, minimum, quantity), expected);
    }

    #[test]
    fn shortfall_description_embeds_quantity() {
        let entry = ShortfallEntry {
            product_id: Uuid::new_v4(),
            sku: "WIDGET-1".to_string(),
            reason: ShortfallReason::InsufficientStock,
            required_quantity: 5,
        };
        assert_eq!(entry.describe(), "insufficient stock (5 units short)");

        let entry = ShortfallEntry {
            reason: ShortfallReason::BelowMinimum,
            required_quantity: 10,
            ..entry
        };
        assert_eq!(
            entry.describe(),
            "stock below minimum (10 units to restore threshold)"
        );
    }
}
