//! Point balance and ledger history endpoints.

use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::api::common::{ApiError, ApiResponse};
use crate::domains::points::PointLog;
use crate::middleware::auth::CurrentUser;
use crate::state::AppState;

fn default_limit() -> i64 {
    20
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    pub points: i32,
}

/// GET /api/v1/points/balance
pub async fn get_balance(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<CurrentUser>,
) -> Result<Json<ApiResponse<BalanceResponse>>, ApiError> {
    let points = state.point_service.balance(current_user.user_id).await?;

    Ok(ApiResponse::success(BalanceResponse { points }))
}

/// GET /api/v1/points/history
pub async fn get_history(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<CurrentUser>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<ApiResponse<Vec<PointLog>>>, ApiError> {
    let limit = query.limit.clamp(1, 100);
    let offset = query.offset.max(0);

    let entries = state
        .point_service
        .history(current_user.user_id, limit, offset)
        .await?;

    Ok(ApiResponse::success(entries))
}
