use crate::{
    db::DbPool,
    entities::product::{self, Entity as ProductEntity},
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, DbErr, EntityTrait, PaginatorTrait, QueryOrder, Set, SqlErr,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateProductRequest {
    #[validate(length(
        min = 1,
        max = 100,
        message = "SKU must be between 1 and 100 characters"
    ))]
    pub sku: String,
    #[validate(length(
        min = 1,
        max = 255,
        message = "Product name must be between 1 and 255 characters"
    ))]
    pub name: String,
    pub description: Option<String>,
    pub unit_price: Decimal,
    #[validate(range(min = 0, message = "Stock on hand cannot be negative"))]
    pub on_hand: i32,
    #[validate(range(min = 0, message = "Minimum stock level cannot be negative"))]
    pub minimum_stock_level: i32,
    #[validate(range(min = 0, message = "Lead time cannot be negative"))]
    pub lead_time_days: i32,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateProductRequest {
    #[validate(length(
        min = 1,
        max = 255,
        message = "Product name must be between 1 and 255 characters"
    ))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub unit_price: Option<Decimal>,
    #[validate(range(min = 0, message = "Minimum stock level cannot be negative"))]
    pub minimum_stock_level: Option<i32>,
    #[validate(range(min = 0, message = "Lead time cannot be negative"))]
    pub lead_time_days: Option<i32>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProductResponse {
    pub id: Uuid,
    pub sku: String,
    pub name: String,
    pub description: Option<String>,
    pub unit_price: Decimal,
    pub on_hand: i32,
    pub minimum_stock_level: i32,
    pub lead_time_days: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<product::Model> for ProductResponse {
    fn from(model: product::Model) -> Self {
        Self {
            id: model.id,
            sku: model.sku,
            name: model.name,
            description: model.description,
            unit_price: model.unit_price,
            on_hand: model.on_hand,
            minimum_stock_level: model.minimum_stock_level,
            lead_time_days: model.lead_time_days,
            is_active: model.is_active,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

/// Service for the product catalog
#[derive(Clone)]
pub struct ProductService {
    db_pool: Arc<DbPool>,
    event_sender: EventSender,
}

impl ProductService {
    /// Creates a new product service instance
    pub fn new(db_pool: Arc<DbPool>, event_sender: EventSender) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Creates a new product
    #[instrument(skip(self, request), fields(sku = %request.sku))]
    pub async fn create_product(
        &self,
        request: CreateProductRequest,
    ) -> Result<ProductResponse, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        let db = &*self.db_pool;
        let sku = request.sku.clone();

        let product = product::ActiveModel {
            id: Set(Uuid::new_v4()),
            sku: Set(request.sku),
            name: Set(request.name),
            description: Set(request.description),
            unit_price: Set(request.unit_price),
            on_hand: Set(request.on_hand),
            minimum_stock_level: Set(request.minimum_stock_level),
            lead_time_days: Set(request.lead_time_days),
            ..Default::default()
        };

        let model = match product.insert(db).await {
            Ok(model) => model,
            Err(e) if is_unique_violation(&e) => {
                return Err(ServiceError::Conflict(format!(
                    "A product with SKU {} already exists",
                    sku
                )));
            }
            Err(e) => {
                error!(error = %e, sku = %sku, "Failed to create product");
                return Err(ServiceError::DatabaseError(e));
            }
        };

        info!(product_id = %model.id, sku = %model.sku, "Product created");

        if let Err(e) = self.event_sender.send(Event::ProductCreated(model.id)).await {
            warn!(error = %e, product_id = %model.id, "Failed to send product created event");
        }

        Ok(model.into())
    }

    /// Retrieves a product by ID
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn get_product(
        &self,
        product_id: Uuid,
    ) -> Result<Option<ProductResponse>, ServiceError> {
        let db = &*self.db_pool;

        let model = ProductEntity::find_by_id(product_id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        Ok(model.map(Into::into))
    }

    /// Lists products with pagination, ordered by SKU
    #[instrument(skip(self))]
    pub async fn list_products(
        &self,
        page: u64,
        limit: u64,
    ) -> Result<(Vec<ProductResponse>, u64), ServiceError> {
        let db = &*self.db_pool;

        let paginator = ProductEntity::find()
            .order_by_asc(product::Column::Sku)
            .paginate(db, limit);

        let total = paginator
            .num_items()
            .await
            .map_err(ServiceError::DatabaseError)?;
        let models = paginator
            .fetch_page(page.saturating_sub(1))
            .await
            .map_err(ServiceError::DatabaseError)?;

        Ok((models.into_iter().map(Into::into).collect(), total))
    }

    /// Updates catalog fields on a product.
    ///
    /// Stock on hand is deliberately excluded; it only moves through
    /// inventory adjustments and production receipts.
    #[instrument(skip(self, request), fields(product_id = %product_id))]
    pub async fn update_product(
        &self,
        product_id: Uuid,
        request: UpdateProductRequest,
    ) -> Result<ProductResponse, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        let db = &*self.db_pool;

        let model = ProductEntity::find_by_id(product_id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| ServiceError::NotFound("Product not found".to_string()))?;

        let mut active_model: product::ActiveModel = model.into();
        if let Some(name) = request.name {
            active_model.name = Set(name);
        }
        if let Some(description) = request.description {
            active_model.description = Set(Some(description));
        }
        if let Some(unit_price) = request.unit_price {
            active_model.unit_price = Set(unit_price);
        }
        if let Some(minimum_stock_level) = request.minimum_stock_level {
            active_model.minimum_stock_level = Set(minimum_stock_level);
        }
        if let Some(lead_time_days) = request.lead_time_days {
            active_model.lead_time_days = Set(lead_time_days);
        }
        if let Some(is_active) = request.is_active {
            active_model.is_active = Set(is_active);
        }

        let updated = active_model
            .update(db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        info!(product_id = %product_id, "Product updated");

        Ok(updated.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use sea_orm::DatabaseConnection;

    fn service() -> ProductService {
        let (tx, _rx) = tokio::sync::mpsc::channel(4);
        ProductService::new(
            Arc::new(DatabaseConnection::Disconnected),
            EventSender::new(tx),
        )
    }

    #[tokio::test]
    async fn create_rejects_negative_stock() {
        let result = service()
            .create_product(CreateProductRequest {
                sku: "WIDGET-1".to_string(),
                name: "Widget".to_string(),
                description: None,
                unit_price: dec!(9.99),
                on_hand: -1,
                minimum_stock_level: 0,
                lead_time_days: 0,
            })
            .await;

        assert!(matches!(result, Err(ServiceError::ValidationError(_))));
    }

    #[test]
    fn response_carries_stock_fields() {
        let now = Utc::now();
        let model = product::Model {
            id: Uuid::new_v4(),
            sku: "WIDGET-1".to_string(),
            name: "Widget".to_string(),
            description: None,
            unit_price: dec!(9.99),
            on_hand: 25,
            minimum_stock_level: 10,
            lead_time_days: 7,
            is_active: true,
            created_at: now,
            updated_at: None,
        };

        let response = ProductResponse::from(model);
        assert_eq!(response.on_hand, 25);
        assert_eq!(response.minimum_stock_level, 10);
        assert_eq!(response.lead_time_days, 7);
    }
}
