use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::services::orders::{
    CreateOrderRequest, CreateOrderResponse, OrderResponse, UpdateOrderStatusRequest,
};
use crate::{errors::ServiceError, ApiResponse, ApiResult, AppState, ListQuery, PaginatedResponse};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CancelOrderRequest {
    pub reason: Option<String>,
}

/// Creates a customer order and any production orders its shortfalls need.
pub async fn create_order(
    State(state): State<AppState>,
    Json(request): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CreateOrderResponse>>), ServiceError> {
    let response = state.services.orders.create_order(request).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(response))))
}

pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<OrderResponse> {
    let order = state
        .services
        .orders
        .get_order(id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Order with ID {} not found", id)))?;

    Ok(Json(ApiResponse::success(order)))
}

pub async fn get_order_by_number(
    State(state): State<AppState>,
    Path(order_number): Path<String>,
) -> ApiResult<OrderResponse> {
    let order = state
        .services
        .orders
        .get_order_by_number(&order_number)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", order_number)))?;

    Ok(Json(ApiResponse::success(order)))
}

pub async fn list_orders(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<PaginatedResponse<OrderResponse>> {
    let response = state
        .services
        .orders
        .list_orders(query.page, query.limit)
        .await?;

    Ok(Json(ApiResponse::success(PaginatedResponse::new(
        response.orders,
        response.total,
        response.page,
        response.per_page,
    ))))
}

pub async fn update_order_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateOrderStatusRequest>,
) -> ApiResult<OrderResponse> {
    let order = state
        .services
        .orders
        .update_order_status(id, request)
        .await?;

    Ok(Json(ApiResponse::success(order)))
}

pub async fn cancel_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<CancelOrderRequest>,
) -> ApiResult<OrderResponse> {
    let order = state
        .services
        .orders
        .cancel_order(id, request.reason)
        .await?;

    Ok(Json(ApiResponse::success(order)))
}
