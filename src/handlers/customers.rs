use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::services::customers::{CreateCustomerRequest, CustomerResponse};
use crate::{errors::ServiceError, ApiResponse, ApiResult, AppState, ListQuery, PaginatedResponse};

pub async fn create_customer(
    State(state): State<AppState>,
    Json(request): Json<CreateCustomerRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CustomerResponse>>), ServiceError> {
    let customer = state.services.customers.create_customer(request).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(customer))))
}

pub async fn get_customer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<CustomerResponse> {
    let customer = state
        .services
        .customers
        .get_customer(id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Customer with ID {} not found", id)))?;

    Ok(Json(ApiResponse::success(customer)))
}

pub async fn list_customers(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<PaginatedResponse<CustomerResponse>> {
    let (customers, total) = state
        .services
        .customers
        .list_customers(query.page, query.limit)
        .await?;

    Ok(Json(ApiResponse::success(PaginatedResponse::new(
        customers,
        total,
        query.page,
        query.limit,
    ))))
}
