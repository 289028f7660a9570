//! One-time point award when an article reaches the published state.
//!
//! The moderation flow calls this after it moves a post to `published`.
//! `posts.points_awarded_on_publish` stores the amount granted; `0` means
//! not granted yet. The guard is checked and set inside the same
//! transaction as the award, so publishing a post twice pays out once.

use sqlx::{FromRow, PgPool};
use tracing::info;

use super::models::{PointError, PointLog, PointType};
use super::point_service::PointService;

/// Fixed award for getting an article published.
pub const POINTS_PER_PUBLISH: i32 = 10;

#[derive(FromRow)]
struct PostForPublish {
    id: i64,
    user_id: Option<i64>,
    title: String,
    status: String,
    points_awarded_on_publish: i32,
}

/// Award the publish bonus for a post. Returns `None` when nothing was
/// awarded: post unknown, not published, authorless, or already granted.
pub async fn award_publish_points(
    db: &PgPool,
    post_id: i64,
) -> Result<Option<PointLog>, PointError> {
    let mut tx = db.begin().await?;

    let post: Option<PostForPublish> = sqlx::query_as(
        r#"
        SELECT id, user_id, title, status, points_awarded_on_publish
        FROM posts
        WHERE id = $1
        FOR UPDATE
        "#,
    )
    .bind(post_id)
    .fetch_optional(&mut *tx)
    .await?;

    let Some(post) = post else {
        return Ok(None);
    };

    if post.status != "published" || post.points_awarded_on_publish != 0 {
        return Ok(None);
    }

    let Some(author_id) = post.user_id else {
        return Ok(None);
    };

    let log = PointService::award_in_tx(
        &mut tx,
        author_id,
        POINTS_PER_PUBLISH,
        PointType::Publish,
        &format!("Published article: {}", post.title),
        Some(post.id),
    )
    .await?;

    sqlx::query(
        r#"
        UPDATE posts
        SET points_awarded_on_publish = $1,
            published_at = COALESCE(published_at, NOW())
        WHERE id = $2
        "#,
    )
    .bind(POINTS_PER_PUBLISH)
    .bind(post.id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    info!(
        "Awarded {} publish points to user {} for post {}",
        POINTS_PER_PUBLISH, author_id, post.id
    );

    Ok(Some(log))
}
