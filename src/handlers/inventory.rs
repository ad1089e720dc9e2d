use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::services::products::ProductResponse;
use crate::{errors::ServiceError, ApiResponse, ApiResult, AppState};

#[derive(Debug, Deserialize, ToSchema)]
pub struct AdjustStockRequest {
    /// Signed stock delta; receipts are positive, write-offs negative.
    pub delta: i32,
    pub reason: Option<String>,
}

/// Lists products currently under their minimum stock level.
pub async fn low_stock(State(state): State<AppState>) -> ApiResult<Vec<ProductResponse>> {
    let products = state.services.inventory.low_stock().await?;

    Ok(Json(ApiResponse::success(
        products.into_iter().map(Into::into).collect(),
    )))
}

pub async fn adjust_stock(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
    Json(request): Json<AdjustStockRequest>,
) -> ApiResult<ProductResponse> {
    if request.delta == 0 {
        return Err(ServiceError::ValidationError(
            "Stock adjustment delta must be non-zero".to_string(),
        ));
    }

    let product = state
        .services
        .inventory
        .adjust_stock(product_id, request.delta, request.reason)
        .await?;

    Ok(Json(ApiResponse::success(product.into())))
}
