// ============================================================================
// REDEMPTIONS API - Catalog, submission and history for contributors
// ============================================================================

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;
use validator::Validate;

use crate::api::common::{ApiError, ApiResponse};
use crate::domains::redemptions::{
    PaymentDetails, PaymentMethod, RedemptionItem, RedemptionRequest,
};
use crate::middleware::auth::CurrentUser;
use crate::state::AppState;

fn default_limit() -> i64 {
    20
}

/// Request body for submitting a redemption. Flat fields; only the ones
/// matching `payment_method` are required.
#[derive(Debug, Deserialize, Validate)]
pub struct SubmitRedemptionRequest {
    pub redemption_item_id: i64,
    pub payment_method: String,
    #[validate(length(max = 100))]
    pub bank_name: Option<String>,
    #[validate(length(max = 50))]
    pub account_number: Option<String>,
    #[validate(length(max = 100))]
    pub account_holder: Option<String>,
    #[validate(length(max = 50))]
    pub ewallet_provider: Option<String>,
    #[validate(length(max = 50))]
    pub ewallet_number: Option<String>,
    #[validate(length(max = 100))]
    pub ewallet_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

/// GET /api/v1/redemptions/items
pub async fn list_items(
    State(state): State<Arc<AppState>>,
    Extension(_current_user): Extension<CurrentUser>,
) -> Result<Json<ApiResponse<Vec<RedemptionItem>>>, ApiError> {
    let items = state.item_service.list_active().await?;

    Ok(ApiResponse::success(items))
}

/// GET /api/v1/redemptions/items/:id
pub async fn get_item(
    State(state): State<Arc<AppState>>,
    Extension(_current_user): Extension<CurrentUser>,
    Path(item_id): Path<i64>,
) -> Result<Json<ApiResponse<RedemptionItem>>, ApiError> {
    let item = state.item_service.find(item_id).await?;

    // Inactive items are invisible outside the admin catalog.
    if !item.is_active {
        return Err(ApiError::NotFound("Hadiah tidak ditemukan".to_string()));
    }

    Ok(ApiResponse::success(item))
}

/// POST /api/v1/redemptions
pub async fn submit_redemption(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<CurrentUser>,
    Json(payload): Json<SubmitRedemptionRequest>,
) -> Result<(StatusCode, Json<ApiResponse<RedemptionRequest>>), ApiError> {
    payload
        .validate()
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let method = PaymentMethod::parse(&payload.payment_method)
        .ok_or_else(|| ApiError::BadRequest("Metode pembayaran tidak dikenal".to_string()))?;

    let details = PaymentDetails::from_parts(
        method,
        payload.bank_name,
        payload.account_number,
        payload.account_holder,
        payload.ewallet_provider,
        payload.ewallet_number,
        payload.ewallet_name,
    )?;

    info!(
        "Redemption submission from user {} for item {}",
        current_user.user_id, payload.redemption_item_id
    );

    let request = state
        .redemption_service
        .submit(current_user.user_id, payload.redemption_item_id, details)
        .await?;

    Ok((
        StatusCode::CREATED,
        ApiResponse::with_message(request, "Permintaan penukaran berhasil diajukan"),
    ))
}

/// GET /api/v1/redemptions/history
pub async fn list_history(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<CurrentUser>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<ApiResponse<Vec<RedemptionRequest>>>, ApiError> {
    let limit = query.limit.clamp(1, 100);
    let offset = query.offset.max(0);

    let requests = state
        .redemption_service
        .user_history(current_user.user_id, limit, offset)
        .await?;

    Ok(ApiResponse::success(requests))
}
