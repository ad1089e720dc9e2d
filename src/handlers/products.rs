use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::services::products::{CreateProductRequest, ProductResponse, UpdateProductRequest};
use crate::{errors::ServiceError, ApiResponse, ApiResult, AppState, ListQuery, PaginatedResponse};

pub async fn create_product(
    State(state): State<AppState>,
    Json(request): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ProductResponse>>), ServiceError> {
    let product = state.services.products.create_product(request).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(product))))
}

pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<ProductResponse> {
    let product = state
        .services
        .products
        .get_product(id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Product with ID {} not found", id)))?;

    Ok(Json(ApiResponse::success(product)))
}

pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<PaginatedResponse<ProductResponse>> {
    let (products, total) = state
        .services
        .products
        .list_products(query.page, query.limit)
        .await?;

    Ok(Json(ApiResponse::success(PaginatedResponse::new(
        products,
        total,
        query.page,
        query.limit,
    ))))
}

pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateProductRequest>,
) -> ApiResult<ProductResponse> {
    let product = state.services.products.update_product(id, request).await?;
    Ok(Json(ApiResponse::success(product)))
}
