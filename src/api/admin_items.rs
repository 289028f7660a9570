// ============================================================================
// ADMIN REDEMPTION ITEMS API - Catalog management
// ============================================================================

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use std::sync::Arc;

use crate::api::common::{require_admin, ApiError, ApiResponse};
use crate::domains::redemptions::{NewRedemptionItem, RedemptionItem, RedemptionItemUpdate};
use crate::middleware::auth::CurrentUser;
use crate::state::AppState;

/// GET /api/v1/admin/redemption-items
pub async fn list_items(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<CurrentUser>,
) -> Result<Json<ApiResponse<Vec<RedemptionItem>>>, ApiError> {
    require_admin(&state.db_pool, &current_user).await?;

    let items = state.item_service.list_all().await?;

    Ok(ApiResponse::success(items))
}

/// POST /api/v1/admin/redemption-items
pub async fn create_item(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<CurrentUser>,
    Json(payload): Json<NewRedemptionItem>,
) -> Result<(StatusCode, Json<ApiResponse<RedemptionItem>>), ApiError> {
    require_admin(&state.db_pool, &current_user).await?;

    let item = state.item_service.create(payload).await?;

    Ok((StatusCode::CREATED, ApiResponse::success(item)))
}

/// PUT /api/v1/admin/redemption-items/:id
pub async fn update_item(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<CurrentUser>,
    Path(item_id): Path<i64>,
    Json(payload): Json<RedemptionItemUpdate>,
) -> Result<Json<ApiResponse<RedemptionItem>>, ApiError> {
    require_admin(&state.db_pool, &current_user).await?;

    let item = state.item_service.update(item_id, payload).await?;

    Ok(ApiResponse::success(item))
}

/// POST /api/v1/admin/redemption-items/:id/activate
pub async fn activate_item(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<CurrentUser>,
    Path(item_id): Path<i64>,
) -> Result<Json<ApiResponse<RedemptionItem>>, ApiError> {
    require_admin(&state.db_pool, &current_user).await?;

    let item = state.item_service.set_active(item_id, true).await?;

    Ok(ApiResponse::success(item))
}

/// POST /api/v1/admin/redemption-items/:id/deactivate
pub async fn deactivate_item(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<CurrentUser>,
    Path(item_id): Path<i64>,
) -> Result<Json<ApiResponse<RedemptionItem>>, ApiError> {
    require_admin(&state.db_pool, &current_user).await?;

    let item = state.item_service.set_active(item_id, false).await?;

    Ok(ApiResponse::success(item))
}
