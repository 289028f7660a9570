// ============================================================================
// ADMIN SETTINGS API - Reward parameter management
// ============================================================================

use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;
use validator::Validate;

use crate::api::common::{require_admin, ApiError, ApiResponse};
use crate::middleware::auth::CurrentUser;
use crate::settings::Setting;
use crate::state::AppState;

fn default_group() -> String {
    "points".to_string()
}

#[derive(Debug, Deserialize)]
pub struct SettingsQuery {
    pub group: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateSettingRequest {
    #[validate(length(min = 1, max = 100))]
    pub key: String,
    #[validate(length(max = 500))]
    pub value: String,
    #[serde(default = "default_group")]
    pub group: String,
}

/// GET /api/v1/admin/settings
pub async fn list_settings(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<CurrentUser>,
    Query(query): Query<SettingsQuery>,
) -> Result<Json<ApiResponse<Vec<Setting>>>, ApiError> {
    require_admin(&state.db_pool, &current_user).await?;

    let settings = state.settings.list(query.group.as_deref()).await?;

    Ok(ApiResponse::success(settings))
}

/// PUT /api/v1/admin/settings
pub async fn update_setting(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<CurrentUser>,
    Json(payload): Json<UpdateSettingRequest>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    require_admin(&state.db_pool, &current_user).await?;

    payload
        .validate()
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    state
        .settings
        .set(&payload.key, &payload.value, &payload.group)
        .await?;

    info!(
        "Setting '{}' updated by admin {}",
        payload.key, current_user.user_id
    );

    Ok(ApiResponse::with_message((), "Pengaturan disimpan"))
}
