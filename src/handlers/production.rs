use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::ProductionOrderStatus;
use crate::services::production::{
    ProductionOrderFilter, ProductionOrderResponse, UpdateProductionOrderStatusRequest,
};
use crate::{errors::ServiceError, ApiResponse, ApiResult, AppState, PaginatedResponse};

fn default_page() -> u64 {
    1
}

fn default_limit() -> u64 {
    20
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ProductionOrderListQuery {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_limit")]
    pub limit: u64,
    pub status: Option<ProductionOrderStatus>,
    pub customer_order_id: Option<Uuid>,
}

pub async fn list_production_orders(
    State(state): State<AppState>,
    Query(query): Query<ProductionOrderListQuery>,
) -> ApiResult<PaginatedResponse<ProductionOrderResponse>> {
    let filter = ProductionOrderFilter {
        status: query.status,
        customer_order_id: query.customer_order_id,
    };

    let (orders, total) = state
        .services
        .production_orders
        .list_production_orders(query.page, query.limit, filter)
        .await?;

    Ok(Json(ApiResponse::success(PaginatedResponse::new(
        orders,
        total,
        query.page,
        query.limit,
    ))))
}

pub async fn get_production_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<ProductionOrderResponse> {
    let production_order = state
        .services
        .production_orders
        .get_production_order(id)
        .await?
        .ok_or_else(|| {
            ServiceError::NotFound(format!("Production order with ID {} not found", id))
        })?;

    Ok(Json(ApiResponse::success(production_order)))
}

pub async fn update_production_order_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateProductionOrderStatusRequest>,
) -> ApiResult<ProductionOrderResponse> {
    let production_order = state
        .services
        .production_orders
        .update_status(id, request.status)
        .await?;

    Ok(Json(ApiResponse::success(production_order)))
}
