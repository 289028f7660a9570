// ============================================================================
// ADMIN REDEMPTIONS API - Review queue and status updates
// ============================================================================

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

use crate::api::common::{require_admin, ApiError, ApiResponse};
use crate::domains::redemptions::{RedemptionRequest, RedemptionStatus};
use crate::middleware::auth::CurrentUser;
use crate::state::AppState;

fn default_limit() -> i64 {
    50
}

#[derive(Debug, Deserialize)]
pub struct AdminListQuery {
    pub status: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateStatusRequest {
    pub status: String,
    #[validate(length(max = 500))]
    pub admin_note: Option<String>,
}

/// GET /api/v1/admin/redemptions
pub async fn list_requests(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<CurrentUser>,
    Query(query): Query<AdminListQuery>,
) -> Result<Json<ApiResponse<Vec<RedemptionRequest>>>, ApiError> {
    require_admin(&state.db_pool, &current_user).await?;

    let status = match query.status.as_deref() {
        None | Some("") => None,
        Some(raw) => Some(
            RedemptionStatus::parse(raw)
                .ok_or_else(|| ApiError::BadRequest(format!("Status tidak dikenal: {raw}")))?,
        ),
    };

    let limit = query.limit.clamp(1, 200);
    let offset = query.offset.max(0);

    let requests = state
        .redemption_service
        .admin_list(status, limit, offset)
        .await?;

    Ok(ApiResponse::success(requests))
}

/// PUT /api/v1/admin/redemptions/:id/status
pub async fn update_status(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<CurrentUser>,
    Path(request_id): Path<i64>,
    Json(payload): Json<UpdateStatusRequest>,
) -> Result<Json<ApiResponse<RedemptionRequest>>, ApiError> {
    require_admin(&state.db_pool, &current_user).await?;

    payload
        .validate()
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let new_status = RedemptionStatus::parse(&payload.status).ok_or_else(|| {
        ApiError::BadRequest(format!("Status tidak dikenal: {}", payload.status))
    })?;

    let updated = state
        .redemption_service
        .update_status(
            request_id,
            new_status,
            current_user.user_id,
            payload.admin_note.as_deref(),
        )
        .await?;

    Ok(ApiResponse::with_message(
        updated,
        format!("Status diperbarui menjadi {}", new_status.label()),
    ))
}
