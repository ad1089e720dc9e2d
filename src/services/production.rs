use crate::{
    db::DbPool,
    entities::customer_order,
    entities::operation::{self, Entity as OperationEntity},
    entities::product::{self, Entity as ProductEntity},
    entities::production_order::{self, Entity as ProductionOrderEntity},
    errors::ServiceError,
    events::{Event, EventSender},
    models::{parse_status, OperationStatus, ProductionOrderStatus, ProductionPriority},
    services::inventory::ShortfallEntry,
    services::work_centers::WorkCenterService,
};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OperationResponse {
    pub id: Uuid,
    pub work_center_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub cost: Decimal,
    pub status: OperationStatus,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProductionOrderResponse {
    pub id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub start_date: DateTime<Utc>,
    pub due_date: NaiveDate,
    pub priority: ProductionPriority,
    pub status: ProductionOrderStatus,
    pub customer_order_id: Option<Uuid>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    /// Populated on single-order lookups; omitted from listings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operations: Option<Vec<OperationResponse>>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdateProductionOrderStatusRequest {
    pub status: ProductionOrderStatus,
}

#[derive(Debug, Default, Deserialize)]
pub struct ProductionOrderFilter {
    pub status: Option<ProductionOrderStatus>,
    pub customer_order_id: Option<Uuid>,
}

/// Production orders are due the day before the customer order is required,
/// regardless of lead time or work center capacity.
pub(crate) fn due_date_for(required_date: NaiveDate) -> Result<NaiveDate, ServiceError> {
    required_date.pred_opt().ok_or_else(|| {
        ServiceError::InvalidInput("Required date is outside the supported range".to_string())
    })
}

/// Traceability note linking a production order back to its origin.
pub(crate) fn replenishment_notes(order_number: &str, shortfall: &ShortfallEntry) -> String {
    format!(
        "Auto-created for order {}: {}",
        order_number,
        shortfall.describe()
    )
}

/// Service for managing production orders and their operations
#[derive(Clone)]
pub struct ProductionOrderService {
    db_pool: Arc<DbPool>,
    work_centers: Arc<WorkCenterService>,
    event_sender: EventSender,
}

impl ProductionOrderService {
    /// Creates a new production order service instance
    pub fn new(
        db_pool: Arc<DbPool>,
        work_centers: Arc<WorkCenterService>,
        event_sender: EventSender,
    ) -> Self {
        Self {
            db_pool,
            work_centers,
            event_sender,
        }
    }

    /// Creates a production order covering one flagged shortfall.
    ///
    /// Runs after the customer order has been committed; the caller treats
    /// failures as per-product outcomes, not as order-creation failures.
    #[instrument(skip(self, order, shortfall), fields(order_number = %order.order_number, product_id = %shortfall.product_id))]
    pub async fn create_for_shortfall(
        &self,
        order: &customer_order::Model,
        shortfall: &ShortfallEntry,
    ) -> Result<ProductionOrderResponse, ServiceError> {
        let db = &*self.db_pool;
        let now = Utc::now();
        let due_date = due_date_for(order.required_date)?;

        let work_center = self
            .work_centers
            .first_active()
            .await?
            .ok_or_else(|| {
                ServiceError::InvalidOperation("No active work center available".to_string())
            })?;

        let txn = db.begin().await.map_err(|e| {
            error!(error = %e, "Failed to start transaction for production order creation");
            ServiceError::DatabaseError(e)
        })?;

        let production_order_id = Uuid::new_v4();
        let production_order = production_order::ActiveModel {
            id: Set(production_order_id),
            product_id: Set(shortfall.product_id),
            quantity: Set(shortfall.required_quantity),
            start_date: Set(now),
            due_date: Set(due_date),
            priority: Set(ProductionPriority::High.to_string()),
            status: Set(ProductionOrderStatus::Pending.to_string()),
            customer_order_id: Set(Some(order.id)),
            notes: Set(Some(replenishment_notes(&order.order_number, shortfall))),
            ..Default::default()
        };

        let production_order_model = production_order.insert(&txn).await.map_err(|e| {
            error!(error = %e, production_order_id = %production_order_id, "Failed to create production order");
            ServiceError::DatabaseError(e)
        })?;

        // Single default operation; cost is corrected later from actuals.
        let operation = operation::ActiveModel {
            id: Set(Uuid::new_v4()),
            production_order_id: Set(production_order_id),
            work_center_id: Set(work_center.id),
            start_time: Set(now),
            end_time: Set(due_date.and_time(NaiveTime::MIN).and_utc()),
            cost: Set(Decimal::ZERO),
            status: Set(OperationStatus::Pending.to_string()),
            ..Default::default()
        };

        let operation_model = operation.insert(&txn).await.map_err(|e| {
            error!(error = %e, production_order_id = %production_order_id, "Failed to create default operation");
            ServiceError::DatabaseError(e)
        })?;

        txn.commit().await.map_err(|e| {
            error!(error = %e, production_order_id = %production_order_id, "Failed to commit production order creation");
            ServiceError::DatabaseError(e)
        })?;

        info!(
            production_order_id = %production_order_id,
            product_id = %shortfall.product_id,
            quantity = shortfall.required_quantity,
            due_date = %due_date,
            "Production order created"
        );

        if let Err(e) = self
            .event_sender
            .send(Event::ProductionOrderCreated {
                production_order_id,
                product_id: shortfall.product_id,
                quantity: shortfall.required_quantity,
                customer_order_id: Some(order.id),
            })
            .await
        {
            warn!(error = %e, production_order_id = %production_order_id, "Failed to send production order created event");
        }

        Self::model_to_response(production_order_model, Some(vec![operation_model]))
    }

    /// Retrieves a production order with its operations
    #[instrument(skip(self), fields(production_order_id = %production_order_id))]
    pub async fn get_production_order(
        &self,
        production_order_id: Uuid,
    ) -> Result<Option<ProductionOrderResponse>, ServiceError> {
        let db = &*self.db_pool;

        let model = ProductionOrderEntity::find_by_id(production_order_id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        let Some(model) = model else {
            return Ok(None);
        };

        let operations = OperationEntity::find()
            .filter(operation::Column::ProductionOrderId.eq(production_order_id))
            .order_by_asc(operation::Column::StartTime)
            .all(db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        Ok(Some(Self::model_to_response(model, Some(operations))?))
    }

    /// Lists production orders with optional status / originating-order filters
    #[instrument(skip(self))]
    pub async fn list_production_orders(
        &self,
        page: u64,
        limit: u64,
        filter: ProductionOrderFilter,
    ) -> Result<(Vec<ProductionOrderResponse>, u64), ServiceError> {
        let db = &*self.db_pool;

        let mut query = ProductionOrderEntity::find();
        if let Some(status) = filter.status {
            query = query.filter(production_order::Column::Status.eq(status.to_string()));
        }
        if let Some(customer_order_id) = filter.customer_order_id {
            query =
                query.filter(production_order::Column::CustomerOrderId.eq(customer_order_id));
        }

        let paginator = query
            .order_by_desc(production_order::Column::CreatedAt)
            .paginate(db, limit);

        let total = paginator
            .num_items()
            .await
            .map_err(ServiceError::DatabaseError)?;
        let models = paginator
            .fetch_page(page.saturating_sub(1))
            .await
            .map_err(ServiceError::DatabaseError)?;

        let responses = models
            .into_iter()
            .map(|model| Self::model_to_response(model, None))
            .collect::<Result<Vec<_>, _>>()?;

        Ok((responses, total))
    }

    /// Advances a production order through its lifecycle.
    ///
    /// Completing an order receipts the produced quantity into the product's
    /// stock in the same transaction.
    #[instrument(skip(self), fields(production_order_id = %production_order_id, new_status = %new_status))]
    pub async fn update_status(
        &self,
        production_order_id: Uuid,
        new_status: ProductionOrderStatus,
    ) -> Result<ProductionOrderResponse, ServiceError> {
        let db = &*self.db_pool;
        let now = Utc::now();

        let txn = db.begin().await.map_err(ServiceError::DatabaseError)?;

        let model = ProductionOrderEntity::find_by_id(production_order_id)
            .one(&txn)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| ServiceError::NotFound("Production order not found".to_string()))?;

        let current: ProductionOrderStatus = parse_status(&model.status)?;
        if !current.can_transition_to(new_status) {
            return Err(ServiceError::InvalidOperation(format!(
                "Production order cannot move from {} to {}",
                current, new_status
            )));
        }

        let old_status = model.status.clone();
        let product_id = model.product_id;
        let quantity = model.quantity;

        let mut active_model: production_order::ActiveModel = model.into();
        active_model.status = Set(new_status.to_string());
        active_model.updated_at = Set(Some(now));

        let updated = active_model
            .update(&txn)
            .await
            .map_err(ServiceError::DatabaseError)?;

        if new_status == ProductionOrderStatus::Completed {
            let product_model = ProductEntity::find_by_id(product_id)
                .one(&txn)
                .await
                .map_err(ServiceError::DatabaseError)?
                .ok_or_else(|| {
                    ServiceError::NotFound("Product for production order not found".to_string())
                })?;

            let new_on_hand = product_model.on_hand + quantity;
            let mut product_active: product::ActiveModel = product_model.into();
            product_active.on_hand = Set(new_on_hand);
            product_active
                .update(&txn)
                .await
                .map_err(ServiceError::DatabaseError)?;
        }

        txn.commit().await.map_err(ServiceError::DatabaseError)?;

        info!(
            production_order_id = %production_order_id,
            old_status = %old_status,
            new_status = %new_status,
            "Production order status updated"
        );

        if let Err(e) = self
            .event_sender
            .send(Event::ProductionOrderStatusChanged {
                production_order_id,
                old_status,
                new_status: new_status.to_string(),
            })
            .await
        {
            warn!(error = %e, production_order_id = %production_order_id, "Failed to send production order status event");
        }

        if new_status == ProductionOrderStatus::Completed {
            if let Err(e) = self
                .event_sender
                .send(Event::ProductionOrderCompleted {
                    production_order_id,
                    product_id,
                    quantity,
                })
                .await
            {
                warn!(error = %e, production_order_id = %production_order_id, "Failed to send production order completed event");
            }
        }

        Self::model_to_response(updated, None)
    }

    fn model_to_response(
        model: production_order::Model,
        operations: Option<Vec<operation::Model>>,
    ) -> Result<ProductionOrderResponse, ServiceError> {
        let operations = operations
            .map(|models| {
                models
                    .into_iter()
                    .map(|op| {
                        Ok(OperationResponse {
                            id: op.id,
                            work_center_id: op.work_center_id,
                            start_time: op.start_time,
                            end_time: op.end_time,
                            cost: op.cost,
                            status: parse_status(&op.status)?,
                        })
                    })
                    .collect::<Result<Vec<_>, ServiceError>>()
            })
            .transpose()?;

        Ok(ProductionOrderResponse {
            id: model.id,
            product_id: model.product_id,
            quantity: model.quantity,
            start_date: model.start_date,
            due_date: model.due_date,
            priority: parse_status(&model.priority)?,
            status: parse_status(&model.status)?,
            customer_order_id: model.customer_order_id,
            notes: model.notes,
            created_at: model.created_at,
            updated_at: model.updated_at,
            operations,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ShortfallReason;

    #[test]
    fn due_date_is_one_day_before_required_date() {
        let required = NaiveDate::from_ymd_opt(2025, 6, 10).unwrap();
        let due = due_date_for(required).unwrap();
        assert_eq!(due, NaiveDate::from_ymd_opt(2025, 6, 9).unwrap());
    }

    #[test]
    fn due_date_crosses_month_and_year_boundaries() {
        let required = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        let due = due_date_for(required).unwrap();
        assert_eq!(due, NaiveDate::from_ymd_opt(2025, 12, 31).unwrap());
    }

    #[test]
    fn replenishment_notes_embed_order_number_and_reason() {
        let shortfall = ShortfallEntry {
            product_id: Uuid::new_v4(),
            sku: "WIDGET-1".to_string(),
            reason: ShortfallReason::InsufficientStock,
            required_quantity: 5,
        };

        let notes = replenishment_notes("CO-2025-0001", &shortfall);
        assert_eq!(
            notes,
            "Auto-created for order CO-2025-0001: insufficient stock (5 units short)"
        );
    }
}
