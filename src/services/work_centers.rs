use crate::{
    db::DbPool,
    entities::work_center::{self, Entity as WorkCenterEntity},
    errors::ServiceError,
    events::{Event, EventSender},
    models::{parse_status, WorkCenterStatus},
};
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateWorkCenterRequest {
    #[validate(length(
        min = 1,
        max = 255,
        message = "Work center name must be between 1 and 255 characters"
    ))]
    pub name: String,
    pub description: Option<String>,
    /// Defaults to active when omitted.
    pub status: Option<WorkCenterStatus>,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateWorkCenterStatusRequest {
    pub status: WorkCenterStatus,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct WorkCenterResponse {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub status: WorkCenterStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Service for managing work centers
#[derive(Clone)]
pub struct WorkCenterService {
    db_pool: Arc<DbPool>,
    event_sender: EventSender,
}

impl WorkCenterService {
    /// Creates a new work center service instance
    pub fn new(db_pool: Arc<DbPool>, event_sender: EventSender) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Creates a new work center
    #[instrument(skip(self, request), fields(name = %request.name))]
    pub async fn create_work_center(
        &self,
        request: CreateWorkCenterRequest,
    ) -> Result<WorkCenterResponse, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        let db = &*self.db_pool;
        let status = request.status.unwrap_or(WorkCenterStatus::Active);

        let work_center = work_center::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(request.name),
            description: Set(request.description),
            status: Set(status.to_string()),
            ..Default::default()
        };

        let model = work_center.insert(db).await.map_err(|e| {
            error!(error = %e, "Failed to create work center");
            ServiceError::DatabaseError(e)
        })?;

        info!(work_center_id = %model.id, status = %model.status, "Work center created");

        Self::model_to_response(model)
    }

    /// Retrieves a work center by ID
    #[instrument(skip(self), fields(work_center_id = %work_center_id))]
    pub async fn get_work_center(
        &self,
        work_center_id: Uuid,
    ) -> Result<Option<WorkCenterResponse>, ServiceError> {
        let db = &*self.db_pool;

        let model = WorkCenterEntity::find_by_id(work_center_id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        model.map(Self::model_to_response).transpose()
    }

    /// Lists work centers with pagination, oldest first
    #[instrument(skip(self))]
    pub async fn list_work_centers(
        &self,
        page: u64,
        limit: u64,
    ) -> Result<(Vec<WorkCenterResponse>, u64), ServiceError> {
        let db = &*self.db_pool;

        let paginator = WorkCenterEntity::find()
            .order_by_asc(work_center::Column::CreatedAt)
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
            .map(Self::model_to_response)
            .collect::<Result<Vec<_>, _>>()?;

        Ok((responses, total))
    }

    /// Updates a work center's status
    #[instrument(skip(self), fields(work_center_id = %work_center_id, new_status = %status))]
    pub async fn set_status(
        &self,
        work_center_id: Uuid,
        status: WorkCenterStatus,
    ) -> Result<WorkCenterResponse, ServiceError> {
        let db = &*self.db_pool;

        let model = WorkCenterEntity::find_by_id(work_center_id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| ServiceError::NotFound("Work center not found".to_string()))?;

        let old_status = model.status.clone();

        let mut active_model: work_center::ActiveModel = model.into();
        active_model.status = Set(status.to_string());
        active_model.updated_at = Set(Some(Utc::now()));

        let updated = active_model
            .update(db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        info!(work_center_id = %work_center_id, old_status = %old_status, new_status = %status, "Work center status updated");

        if let Err(e) = self
            .event_sender
            .send(Event::WorkCenterStatusChanged {
                work_center_id,
                old_status,
                new_status: status.to_string(),
            })
            .await
        {
            warn!(error = %e, work_center_id = %work_center_id, "Failed to send work center status event");
        }

        Self::model_to_response(updated)
    }

    /// Returns the first active work center, earliest created.
    ///
    /// Production operations are bound to this center; capability matching
    /// against the product is out of scope.
    #[instrument(skip(self))]
    pub async fn first_active(&self) -> Result<Option<work_center::Model>, ServiceError> {
        let db = &*self.db_pool;

        WorkCenterEntity::find()
            .filter(work_center::Column::Status.eq(WorkCenterStatus::Active.to_string()))
            .order_by_asc(work_center::Column::CreatedAt)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)
    }

    fn model_to_response(model: work_center::Model) -> Result<WorkCenterResponse, ServiceError> {
        Ok(WorkCenterResponse {
            id: model.id,
            name: model.name,
            description: model.description,
            status: parse_status(&model.status)?,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
