use crate::{
    db::DbPool,
    entities::customer::{self, Entity as CustomerEntity},
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, DbErr, EntityTrait, PaginatorTrait, QueryOrder, Set, SqlErr};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateCustomerRequest {
    #[validate(length(
        min = 1,
        max = 255,
        message = "Customer name must be between 1 and 255 characters"
    ))]
    pub name: String,
    #[validate(email(message = "Email must be a valid email address"))]
    pub email: String,
    pub phone: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CustomerResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<customer::Model> for CustomerResponse {
    fn from(model: customer::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            email: model.email,
            phone: model.phone,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

/// Service for the customer directory
#[derive(Clone)]
pub struct CustomerService {
    db_pool: Arc<DbPool>,
    event_sender: EventSender,
}

impl CustomerService {
    /// Creates a new customer service instance
    pub fn new(db_pool: Arc<DbPool>, event_sender: EventSender) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Creates a new customer
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn create_customer(
        &self,
        request: CreateCustomerRequest,
    ) -> Result<CustomerResponse, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        let db = &*self.db_pool;
        let email = request.email.clone();

        let customer = customer::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(request.name),
            email: Set(request.email),
            phone: Set(request.phone),
            ..Default::default()
        };

        let model = match customer.insert(db).await {
            Ok(model) => model,
            Err(e) if is_unique_violation(&e) => {
                return Err(ServiceError::Conflict(format!(
                    "A customer with email {} already exists",
                    email
                )));
            }
            Err(e) => {
                error!(error = %e, "Failed to create customer");
                return Err(ServiceError::DatabaseError(e));
            }
        };

        info!(customer_id = %model.id, "Customer created");

        if let Err(e) = self
            .event_sender
            .send(Event::CustomerCreated(model.id))
            .await
        {
            warn!(error = %e, customer_id = %model.id, "Failed to send customer created event");
        }

        Ok(model.into())
    }

    /// Retrieves a customer by ID
    #[instrument(skip(self), fields(customer_id = %customer_id))]
    pub async fn get_customer(
        &self,
        customer_id: Uuid,
    ) -> Result<Option<CustomerResponse>, ServiceError> {
        let db = &*self.db_pool;

        let model = CustomerEntity::find_by_id(customer_id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        Ok(model.map(Into::into))
    }

    /// Lists customers with pagination, ordered by name
    #[instrument(skip(self))]
    pub async fn list_customers(
        &self,
        page: u64,
        limit: u64,
    ) -> Result<(Vec<CustomerResponse>, u64), ServiceError> {
        let db = &*self.db_pool;

        let paginator = CustomerEntity::find()
            .order_by_asc(customer::Column::Name)
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
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::DatabaseConnection;

    #[tokio::test]
    async fn create_rejects_invalid_email() {
        let (tx, _rx) = tokio::sync::mpsc::channel(4);
        let service = CustomerService::new(
            Arc::new(DatabaseConnection::Disconnected),
            EventSender::new(tx),
        );

        let result = service
            .create_customer(CreateCustomerRequest {
                name: "Acme Corp".to_string(),
                email: "not-an-email".to_string(),
                phone: None,
            })
            .await;

        assert!(matches!(result, Err(ServiceError::ValidationError(_))));
    }
}
