// ============================================================================
// ADMIN POSTS API - Moderation transition that pays the publish bonus
// ============================================================================

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

use crate::api::common::{require_admin, ApiError, ApiResponse};
use crate::domains::points::award_publish_points;
use crate::middleware::auth::CurrentUser;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct PublishResponse {
    pub post_id: i64,
    /// Points granted by this call; 0 when the bonus was already paid.
    pub awarded_points: i32,
}

/// POST /api/v1/admin/posts/:id/publish
///
/// Moves a post to `published` and fires the one-time publish award.
/// Publishing an already-published post is a harmless no-op for points.
pub async fn publish_post(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<CurrentUser>,
    Path(post_id): Path<i64>,
) -> Result<Json<ApiResponse<PublishResponse>>, ApiError> {
    require_admin(&state.db_pool, &current_user).await?;

    let updated = sqlx::query("UPDATE posts SET status = 'published' WHERE id = $1")
        .bind(post_id)
        .execute(&state.db_pool)
        .await?;

    if updated.rows_affected() == 0 {
        return Err(ApiError::NotFound("Artikel tidak ditemukan".to_string()));
    }

    let log = award_publish_points(&state.db_pool, post_id).await?;
    let awarded_points = log.map(|l| l.points).unwrap_or(0);

    info!(
        "Post {} published by admin {} ({} points awarded)",
        post_id, current_user.user_id, awarded_points
    );

    Ok(ApiResponse::success(PublishResponse {
        post_id,
        awarded_points,
    }))
}
