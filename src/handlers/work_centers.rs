use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::services::work_centers::{
    CreateWorkCenterRequest, UpdateWorkCenterStatusRequest, WorkCenterResponse,
};
use crate::{errors::ServiceError, ApiResponse, ApiResult, AppState, ListQuery, PaginatedResponse};

pub async fn create_work_center(
    State(state): State<AppState>,
    Json(request): Json<CreateWorkCenterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<WorkCenterResponse>>), ServiceError> {
    let work_center = state
        .services
        .work_centers
        .create_work_center(request)
        .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::success(work_center))))
}

pub async fn get_work_center(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<WorkCenterResponse> {
    let work_center = state
        .services
        .work_centers
        .get_work_center(id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Work center with ID {} not found", id)))?;

    Ok(Json(ApiResponse::success(work_center)))
}

pub async fn list_work_centers(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<PaginatedResponse<WorkCenterResponse>> {
    let (work_centers, total) = state
        .services
        .work_centers
        .list_work_centers(query.page, query.limit)
        .await?;

    Ok(Json(ApiResponse::success(PaginatedResponse::new(
        work_centers,
        total,
        query.page,
        query.limit,
    ))))
}

pub async fn update_work_center_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateWorkCenterStatusRequest>,
) -> ApiResult<WorkCenterResponse> {
    let work_center = state
        .services
        .work_centers
        .set_status(id, request.status)
        .await?;

    Ok(Json(ApiResponse::success(work_center)))
}
