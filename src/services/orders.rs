use crate::{
    db::DbPool,
    entities::customer::Entity as CustomerEntity,
    entities::customer_order::{self, Entity as CustomerOrderEntity},
    entities::order_line::{self, Entity as OrderLineEntity},
    errors::ServiceError,
    events::{Event, EventSender},
    models::{parse_status, OrderStatus, ShortfallReason},
    services::inventory::{InventoryService, LineRequirement},
    services::production::{ProductionOrderResponse, ProductionOrderService},
};
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set, SqlErr, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

pub const ORDER_NUMBER_PREFIX: &str = "CO";
const ORDER_NUMBER_SEQUENCE_WIDTH: usize = 4;
// Bounded retry against order-number allocation races; the unique index on
// order_number turns the lost race into a conflict we can recover from.
const ORDER_NUMBER_MAX_ATTEMPTS: u32 = 3;

/// Request/Response types for the customer order service
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateOrderRequest {
    pub customer_id: Uuid,
    /// ISO-8601 calendar date (YYYY-MM-DD)
    #[validate(length(min = 1, message = "required_date is required"))]
    pub required_date: String,
    #[validate(length(min = 1, message = "At least one order line is required"))]
    pub order_lines: Vec<CreateOrderLine>,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateOrderLine {
    pub product_id: Uuid,
    #[validate(range(min = 1, message = "Quantity must be a positive integer"))]
    pub quantity: i32,
    pub unit_price: Decimal,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateOrderStatusRequest {
    pub status: OrderStatus,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderResponse {
    pub id: Uuid,
    pub order_number: String,
    pub customer_id: Uuid,
    pub status: OrderStatus,
    pub order_date: DateTime<Utc>,
    pub required_date: NaiveDate,
    pub total_amount: Decimal,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub version: i32,
    /// Populated on single-order lookups and creation; omitted from listings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lines: Option<Vec<OrderLineResponse>>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderLineResponse {
    pub id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub status: OrderStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TriggerStatus {
    Created,
    Failed,
}

/// Per-product outcome of the post-persistence production order fan-out.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReplenishmentOutcome {
    pub product_id: Uuid,
    pub reason: ShortfallReason,
    pub required_quantity: i32,
    pub status: TriggerStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub production_order_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateOrderResponse {
    pub order: OrderResponse,
    pub production_orders: Vec<ProductionOrderResponse>,
    /// One entry per flagged product, successful or not, so callers can
    /// render true partial-success state.
    pub replenishment: Vec<ReplenishmentOutcome>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderListResponse {
    pub orders: Vec<OrderResponse>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
}

fn order_number_prefix(year: i32) -> String {
    format!("{}-{}-", ORDER_NUMBER_PREFIX, year)
}

fn format_order_number(year: i32, sequence: u32) -> String {
    format!(
        "{}{:0width$}",
        order_number_prefix(year),
        sequence,
        width = ORDER_NUMBER_SEQUENCE_WIDTH
    )
}

/// Next sequence after the most recently issued number for the year.
///
/// A stored number whose trailing segment fails to parse is corrupt data and
/// surfaces as an internal error rather than a panic.
fn next_sequence(prefix: &str, last_order_number: Option<&str>) -> Result<u32, ServiceError> {
    match last_order_number {
        None => Ok(1),
        Some(last) => last
            .strip_prefix(prefix)
            .and_then(|segment| segment.parse::<u32>().ok())
            .map(|sequence| sequence + 1)
            .ok_or_else(|| {
                error!(order_number = %last, "Stored order number has a malformed sequence segment");
                ServiceError::InternalError(format!(
                    "Stored order number {} does not match the expected sequence format",
                    last
                ))
            }),
    }
}

fn compute_total(lines: &[CreateOrderLine]) -> Decimal {
    lines
        .iter()
        .map(|line| Decimal::from(line.quantity) * line.unit_price)
        .sum()
}

/// Duplicate product ids across lines; callers must pre-aggregate quantities.
fn duplicate_products(lines: &[CreateOrderLine]) -> Vec<Uuid> {
    let mut seen = HashSet::new();
    let mut duplicates = Vec::new();
    for line in lines {
        if !seen.insert(line.product_id) && !duplicates.contains(&line.product_id) {
            duplicates.push(line.product_id);
        }
    }
    duplicates
}

fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

/// Service for customer orders and the order-intake pipeline
#[derive(Clone)]
pub struct CustomerOrderService {
    db_pool: Arc<DbPool>,
    inventory: Arc<InventoryService>,
    production: Arc<ProductionOrderService>,
    event_sender: EventSender,
}

impl CustomerOrderService {
    /// Creates a new customer order service instance
    pub fn new(
        db_pool: Arc<DbPool>,
        inventory: Arc<InventoryService>,
        production: Arc<ProductionOrderService>,
        event_sender: EventSender,
    ) -> Self {
        Self {
            db_pool,
            inventory,
            production,
            event_sender,
        }
    }

    /// Creates a customer order and triggers replenishment for any product
    /// the sufficiency check flags.
    ///
    /// The order and its lines commit first; production orders are then
    /// created best-effort, one per shortfall, and each outcome is reported
    /// back to the caller. The sufficiency snapshot is taken before
    /// persistence and is not re-checked afterwards.
    #[instrument(skip(self, request), fields(customer_id = %request.customer_id, line_count = request.order_lines.len()))]
    pub async fn create_order(
        &self,
        request: CreateOrderRequest,
    ) -> Result<CreateOrderResponse, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;
        for (index, line) in request.order_lines.iter().enumerate() {
            line.validate().map_err(|e| {
                ServiceError::ValidationError(format!("order_lines[{}]: {}", index, e))
            })?;
        }

        let required_date = NaiveDate::parse_from_str(request.required_date.trim(), "%Y-%m-%d")
            .map_err(|_| {
                ServiceError::ValidationError(
                    "required_date must be a valid calendar date in YYYY-MM-DD format".to_string(),
                )
            })?;

        let duplicates = duplicate_products(&request.order_lines);
        if !duplicates.is_empty() {
            return Err(ServiceError::ValidationError(format!(
                "Duplicate products across order lines (aggregate quantities per product before ordering): {}",
                duplicates
                    .iter()
                    .map(Uuid::to_string)
                    .collect::<Vec<_>>()
                    .join(", ")
            )));
        }

        let db = &*self.db_pool;

        let customer = CustomerEntity::find_by_id(request.customer_id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?;
        if customer.is_none() {
            return Err(ServiceError::ValidationError(format!(
                "Customer {} not found",
                request.customer_id
            )));
        }

        // Sufficiency snapshot before any write.
        let requirements: Vec<LineRequirement> = request
            .order_lines
            .iter()
            .map(|line| LineRequirement {
                product_id: line.product_id,
                quantity: line.quantity,
            })
            .collect();
        let shortfalls = self.inventory.check_order_lines(&requirements).await?;

        let total_amount = compute_total(&request.order_lines);
        let now = Utc::now();

        let mut persisted = None;
        let mut attempt = 0;
        while persisted.is_none() {
            attempt += 1;

            let txn = db.begin().await.map_err(|e| {
                error!(error = %e, "Failed to start transaction for order creation");
                ServiceError::DatabaseError(e)
            })?;

            let order_number = Self::allocate_order_number(&txn, now).await?;
            let order_id = Uuid::new_v4();

            let order_active_model = customer_order::ActiveModel {
                id: Set(order_id),
                order_number: Set(order_number.clone()),
                customer_id: Set(request.customer_id),
                status: Set(OrderStatus::Pending.to_string()),
                order_date: Set(now),
                required_date: Set(required_date),
                total_amount: Set(total_amount),
                notes: Set(request.notes.clone()),
                created_at: Set(now),
                updated_at: Set(Some(now)),
                version: Set(1),
            };

            match order_active_model.insert(&txn).await {
                Ok(order_model) => {
                    let mut line_models = Vec::with_capacity(request.order_lines.len());
                    for line in &request.order_lines {
                        let line_model = order_line::ActiveModel {
                            id: Set(Uuid::new_v4()),
                            order_id: Set(order_id),
                            product_id: Set(line.product_id),
                            quantity: Set(line.quantity),
                            unit_price: Set(line.unit_price),
                            status: Set(OrderStatus::Pending.to_string()),
                            ..Default::default()
                        }
                        .insert(&txn)
                        .await
                        .map_err(|e| {
                            error!(error = %e, order_id = %order_id, "Failed to create order line");
                            ServiceError::DatabaseError(e)
                        })?;
                        line_models.push(line_model);
                    }

                    txn.commit().await.map_err(|e| {
                        error!(error = %e, order_id = %order_id, "Failed to commit order creation transaction");
                        ServiceError::DatabaseError(e)
                    })?;

                    persisted = Some((order_model, line_models));
                }
                Err(e) if is_unique_violation(&e) && attempt < ORDER_NUMBER_MAX_ATTEMPTS => {
                    warn!(
                        attempt = attempt,
                        order_number = %order_number,
                        "Order number allocation conflicted with a concurrent order; retrying"
                    );
                    let _ = txn.rollback().await;
                }
                Err(e) if is_unique_violation(&e) => {
                    error!(
                        attempts = attempt,
                        "Order number allocation kept conflicting; giving up"
                    );
                    return Err(ServiceError::Conflict(
                        "Could not allocate a unique order number".to_string(),
                    ));
                }
                Err(e) => {
                    error!(error = %e, order_id = %order_id, "Failed to create order in database");
                    return Err(ServiceError::DatabaseError(e));
                }
            }
        }

        let (order_model, line_models) = match persisted {
            Some(result) => result,
            None => {
                return Err(ServiceError::InternalError(
                    "Order persistence loop ended without a result".to_string(),
                ))
            }
        };

        info!(
            order_id = %order_model.id,
            order_number = %order_model.order_number,
            customer_id = %request.customer_id,
            total_amount = %order_model.total_amount,
            shortfall_count = shortfalls.len(),
            "Customer order created"
        );

        // Best-effort fan-out: one production order per shortfall. Failures
        // are reported per product; the order itself has already committed.
        let mut production_orders = Vec::new();
        let mut replenishment = Vec::with_capacity(shortfalls.len());
        for shortfall in &shortfalls {
            match self
                .production
                .create_for_shortfall(&order_model, shortfall)
                .await
            {
                Ok(production_order) => {
                    replenishment.push(ReplenishmentOutcome {
                        product_id: shortfall.product_id,
                        reason: shortfall.reason,
                        required_quantity: shortfall.required_quantity,
                        status: TriggerStatus::Created,
                        production_order_id: Some(production_order.id),
                        error: None,
                    });
                    production_orders.push(production_order);
                }
                Err(e) => {
                    error!(
                        error = %e,
                        product_id = %shortfall.product_id,
                        order_number = %order_model.order_number,
                        "Failed to create production order for shortfall; continuing"
                    );
                    replenishment.push(ReplenishmentOutcome {
                        product_id: shortfall.product_id,
                        reason: shortfall.reason,
                        required_quantity: shortfall.required_quantity,
                        status: TriggerStatus::Failed,
                        production_order_id: None,
                        error: Some(e.response_message()),
                    });
                }
            }
        }

        if let Err(e) = self.event_sender.send(Event::OrderCreated(order_model.id)).await {
            warn!(error = %e, order_id = %order_model.id, "Failed to send order created event");
        }

        Ok(CreateOrderResponse {
            order: Self::model_to_response(order_model, Some(line_models))?,
            production_orders,
            replenishment,
        })
    }

    /// Finds the last issued number for the current year and increments it.
    async fn allocate_order_number<C: ConnectionTrait>(
        conn: &C,
        now: DateTime<Utc>,
    ) -> Result<String, ServiceError> {
        let year = now.year();
        let prefix = order_number_prefix(year);

        let last = CustomerOrderEntity::find()
            .filter(customer_order::Column::OrderNumber.starts_with(&prefix))
            .order_by_desc(customer_order::Column::OrderNumber)
            .one(conn)
            .await
            .map_err(ServiceError::DatabaseError)?;

        let sequence = next_sequence(&prefix, last.as_ref().map(|o| o.order_number.as_str()))?;
        Ok(format_order_number(year, sequence))
    }

    /// Retrieves an order with its lines
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn get_order(&self, order_id: Uuid) -> Result<Option<OrderResponse>, ServiceError> {
        let db = &*self.db_pool;

        let order = CustomerOrderEntity::find_by_id(order_id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        let Some(order) = order else {
            return Ok(None);
        };

        let lines = self.load_lines(order.id).await?;
        Ok(Some(Self::model_to_response(order, Some(lines))?))
    }

    /// Retrieves an order by its human-readable number
    #[instrument(skip(self), fields(order_number = %order_number))]
    pub async fn get_order_by_number(
        &self,
        order_number: &str,
    ) -> Result<Option<OrderResponse>, ServiceError> {
        let db = &*self.db_pool;

        let order = CustomerOrderEntity::find()
            .filter(customer_order::Column::OrderNumber.eq(order_number))
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        let Some(order) = order else {
            return Ok(None);
        };

        let lines = self.load_lines(order.id).await?;
        Ok(Some(Self::model_to_response(order, Some(lines))?))
    }

    /// Lists orders with pagination, newest first
    #[instrument(skip(self))]
    pub async fn list_orders(
        &self,
        page: u64,
        per_page: u64,
    ) -> Result<OrderListResponse, ServiceError> {
        let db = &*self.db_pool;

        let paginator = CustomerOrderEntity::find()
            .order_by_desc(customer_order::Column::CreatedAt)
            .paginate(db, per_page);

        let total = paginator.num_items().await.map_err(|e| {
            error!(error = %e, "Failed to count orders");
            ServiceError::DatabaseError(e)
        })?;

        let orders = paginator.fetch_page(page.saturating_sub(1)).await.map_err(|e| {
            error!(error = %e, page = page, per_page = per_page, "Failed to fetch orders page");
            ServiceError::DatabaseError(e)
        })?;

        let order_responses = orders
            .into_iter()
            .map(|order| Self::model_to_response(order, None))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(OrderListResponse {
            orders: order_responses,
            total,
            page,
            per_page,
        })
    }

    /// Updates an order's status
    #[instrument(skip(self, request), fields(order_id = %order_id, new_status = %request.status))]
    pub async fn update_order_status(
        &self,
        order_id: Uuid,
        request: UpdateOrderStatusRequest,
    ) -> Result<OrderResponse, ServiceError> {
        let db = &*self.db_pool;
        let now = Utc::now();

        let txn = db.begin().await.map_err(|e| {
            error!(error = %e, order_id = %order_id, "Failed to start transaction for status update");
            ServiceError::DatabaseError(e)
        })?;

        let order = CustomerOrderEntity::find_by_id(order_id)
            .one(&txn)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| {
                warn!(order_id = %order_id, "Order not found for status update");
                ServiceError::NotFound("Order not found".to_string())
            })?;

        let current: OrderStatus = parse_status(&order.status)?;
        if !current.can_transition_to(request.status) {
            return Err(ServiceError::InvalidOperation(format!(
                "Order cannot move from {} to {}",
                current, request.status
            )));
        }

        let old_status = order.status.clone();
        let version = order.version;

        let mut order_active_model: customer_order::ActiveModel = order.into();
        order_active_model.status = Set(request.status.to_string());
        order_active_model.updated_at = Set(Some(now));
        order_active_model.version = Set(version + 1);

        if let Some(notes) = request.notes {
            order_active_model.notes = Set(Some(notes));
        }

        let updated_order = order_active_model.update(&txn).await.map_err(|e| {
            error!(error = %e, order_id = %order_id, "Failed to update order status");
            ServiceError::DatabaseError(e)
        })?;

        txn.commit().await.map_err(|e| {
            error!(error = %e, order_id = %order_id, "Failed to commit status update transaction");
            ServiceError::DatabaseError(e)
        })?;

        info!(order_id = %order_id, old_status = %old_status, new_status = %request.status, "Order status updated");

        if let Err(e) = self
            .event_sender
            .send(Event::OrderStatusChanged {
                order_id,
                old_status,
                new_status: request.status.to_string(),
            })
            .await
        {
            warn!(error = %e, order_id = %order_id, "Failed to send order status changed event");
        }

        Self::model_to_response(updated_order, None)
    }

    /// Cancels an order
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn cancel_order(
        &self,
        order_id: Uuid,
        reason: Option<String>,
    ) -> Result<OrderResponse, ServiceError> {
        let cancel_request = UpdateOrderStatusRequest {
            status: OrderStatus::Cancelled,
            notes: reason,
        };

        let response = self.update_order_status(order_id, cancel_request).await?;

        if let Err(e) = self.event_sender.send(Event::OrderCancelled(order_id)).await {
            warn!(error = %e, order_id = %order_id, "Failed to send order cancelled event");
        }

        Ok(response)
    }

    async fn load_lines(&self, order_id: Uuid) -> Result<Vec<order_line::Model>, ServiceError> {
        let db = &*self.db_pool;

        OrderLineEntity::find()
            .filter(order_line::Column::OrderId.eq(order_id))
            .order_by_asc(order_line::Column::CreatedAt)
            .all(db)
            .await
            .map_err(ServiceError::DatabaseError)
    }

    fn model_to_response(
        model: customer_order::Model,
        lines: Option<Vec<order_line::Model>>,
    ) -> Result<OrderResponse, ServiceError> {
        let lines = lines
            .map(|models| {
                models
                    .into_iter()
                    .map(|line| {
                        Ok(OrderLineResponse {
                            id: line.id,
                            product_id: line.product_id,
                            quantity: line.quantity,
                            unit_price: line.unit_price,
                            status: parse_status(&line.status)?,
                        })
                    })
                    .collect::<Result<Vec<_>, ServiceError>>()
            })
            .transpose()?;

        Ok(OrderResponse {
            id: model.id,
            order_number: model.order_number,
            customer_id: model.customer_id,
            status: parse_status(&model.status)?,
            order_date: model.order_date,
            required_date: model.required_date,
            total_amount: model.total_amount,
            notes: model.notes,
            created_at: model.created_at,
            updated_at: model.updated_at,
            version: model.version,
            lines,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn order_numbers_are_year_scoped_and_zero_padded() {
        assert_eq!(format_order_number(2025, 1), "CO-2025-0001");
        assert_eq!(format_order_number(2025, 42), "CO-2025-0042");
        assert_eq!(format_order_number(2026, 9999), "CO-2026-9999");
    }

    #[test]
    fn first_order_of_the_year_starts_at_one() {
        assert_eq!(next_sequence("CO-2025-", None).unwrap(), 1);
    }

    #[test]
    fn sequence_increments_from_last_issued_number() {
        assert_eq!(
            next_sequence("CO-2025-", Some("CO-2025-0042")).unwrap(),
            43
        );
    }

    #[test]
    fn malformed_stored_sequence_is_an_internal_error() {
        let err = next_sequence("CO-2025-", Some("CO-2025-00AB")).unwrap_err();
        assert!(matches!(err, ServiceError::InternalError(_)));
    }

    #[test]
    fn total_amount_sums_quantity_times_unit_price() {
        let lines = vec![
            CreateOrderLine {
                product_id: Uuid::new_v4(),
                quantity: 2,
                unit_price: dec!(10),
            },
            CreateOrderLine {
                product_id: Uuid::new_v4(),
                quantity: 3,
                unit_price: dec!(5),
            },
        ];

        assert_eq!(compute_total(&lines), dec!(35));
    }

    #[test]
    fn duplicate_products_are_detected_once_each() {
        let repeated = Uuid::new_v4();
        let lines = vec![
            CreateOrderLine {
                product_id: repeated,
                quantity: 1,
                unit_price: dec!(1),
            },
            CreateOrderLine {
                product_id: Uuid::new_v4(),
                quantity: 1,
                unit_price: dec!(1),
            },
            CreateOrderLine {
                product_id: repeated,
                quantity: 2,
                unit_price: dec!(1),
            },
            CreateOrderLine {
                product_id: repeated,
                quantity: 3,
                unit_price: dec!(1),
            },
        ];

        assert_eq!(duplicate_products(&lines), vec![repeated]);
    }

    #[test]
    fn model_to_response_conversion() {
        let now = Utc::now();
        let order_id = Uuid::new_v4();
        let customer_id = Uuid::new_v4();

        let model = customer_order::Model {
            id: order_id,
            order_number: "CO-2025-0001".to_string(),
            customer_id,
            status: "pending".to_string(),
            order_date: now,
            required_date: NaiveDate::from_ymd_opt(2025, 6, 10).unwrap(),
            total_amount: dec!(99.99),
            notes: Some("Rush order".to_string()),
            created_at: now,
            updated_at: Some(now),
            version: 1,
        };

        let response = CustomerOrderService::model_to_response(model, None).unwrap();

        assert_eq!(response.id, order_id);
        assert_eq!(response.customer_id, customer_id);
        assert_eq!(response.order_number, "CO-2025-0001");
        assert_eq!(response.status, OrderStatus::Pending);
        assert_eq!(response.total_amount, dec!(99.99));
        assert!(response.lines.is_none());
    }
}
