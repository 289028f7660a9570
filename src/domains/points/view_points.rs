//! View-based point accrual.
//!
//! A scheduled pass reconciles every published article's award with its
//! current view count: `floor(view_count / views_per_point)` capped at
//! `max_points_per_article`, minus what was already granted. The post row
//! is locked for the duration of its reconciliation and
//! `points_awarded_from_views` is set to the absolute total (never
//! incremented), so overlapping passes converge instead of double-paying.

use sqlx::{FromRow, PgPool};
use std::sync::Arc;
use tracing::{error, info, warn};

use super::models::{PointError, PointType};
use super::point_service::PointService;
use crate::settings::{defaults, keys, SettingsService};

/// Total points a post has earned from views under the current settings.
pub fn view_points_earned(view_count: i32, views_per_point: i64, max_points: i64) -> i64 {
    if views_per_point <= 0 {
        return 0;
    }
    (i64::from(view_count) / views_per_point).min(max_points)
}

#[derive(FromRow)]
struct PostForAccrual {
    id: i64,
    user_id: Option<i64>,
    title: String,
    view_count: i32,
    points_awarded_from_views: i32,
}

pub struct ViewPointService {
    db: PgPool,
    settings: Arc<SettingsService>,
}

impl ViewPointService {
    pub fn new(db: PgPool, settings: Arc<SettingsService>) -> Self {
        Self { db, settings }
    }

    /// Reconcile one post. Returns the number of points awarded (0 for a
    /// no-op: unpublished, authorless, capped, or nothing new earned).
    pub async fn process_post(&self, post_id: i64) -> Result<i32, PointError> {
        let views_per_point = self
            .settings
            .get_int(keys::VIEWS_PER_POINT, defaults::VIEWS_PER_POINT)
            .await?;
        let max_points = self
            .settings
            .get_int(keys::MAX_POINTS_PER_ARTICLE, defaults::MAX_POINTS_PER_ARTICLE)
            .await?;

        if views_per_point <= 0 {
            return Ok(0);
        }

        let mut tx = self.db.begin().await?;

        // Lock the post row so two passes cannot compute the same stale delta.
        let post: Option<PostForAccrual> = sqlx::query_as(
            r#"
            SELECT id, user_id, title, view_count, points_awarded_from_views
            FROM posts
            WHERE id = $1 AND status = 'published'
            FOR UPDATE
            "#,
        )
        .bind(post_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(post) = post else {
            return Ok(0);
        };

        let total_earned = view_points_earned(post.view_count, views_per_point, max_points) as i32;
        let delta = total_earned - post.points_awarded_from_views;

        if delta <= 0 {
            return Ok(0);
        }

        let Some(author_id) = post.user_id else {
            return Ok(0);
        };

        PointService::award_in_tx(
            &mut tx,
            author_id,
            delta,
            PointType::Views,
            &format!("Points for {} views on: {}", post.view_count, post.title),
            Some(post.id),
        )
        .await?;

        // Absolute total, not `+= delta`: concurrent reconciliations converge.
        sqlx::query("UPDATE posts SET points_awarded_from_views = $1 WHERE id = $2")
            .bind(total_earned)
            .bind(post.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(
            "Awarded {} view points for post {} (total awarded: {})",
            delta, post.id, total_earned
        );

        Ok(delta)
    }

    /// Run the accrual pass over every published post still below the cap.
    /// A failure on one post is logged and does not stop the others.
    pub async fn run(&self) -> Result<u64, PointError> {
        let views_per_point = self
            .settings
            .get_int(keys::VIEWS_PER_POINT, defaults::VIEWS_PER_POINT)
            .await?;
        let max_points = self
            .settings
            .get_int(keys::MAX_POINTS_PER_ARTICLE, defaults::MAX_POINTS_PER_ARTICLE)
            .await?;

        if views_per_point <= 0 {
            warn!("views_per_point setting is 0 or invalid, skipping accrual pass");
            return Ok(0);
        }

        let post_ids: Vec<i64> = sqlx::query_scalar(
            r#"
            SELECT id
            FROM posts
            WHERE status = 'published' AND points_awarded_from_views < $1
            ORDER BY id
            "#,
        )
        .bind(max_points as i32)
        .fetch_all(&self.db)
        .await?;

        info!(
            "View point pass: {} eligible posts (1 point per {} views, cap {})",
            post_ids.len(),
            views_per_point,
            max_points
        );

        let mut awarded_posts = 0u64;
        for post_id in post_ids {
            match self.process_post(post_id).await {
                Ok(delta) if delta > 0 => awarded_posts += 1,
                Ok(_) => {}
                Err(e) => error!("Failed to process view points for post {}: {}", post_id, e),
            }
        }

        Ok(awarded_posts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_accrual() {
        assert_eq!(view_points_earned(0, 100, 10), 0);
        assert_eq!(view_points_earned(99, 100, 10), 0);
        assert_eq!(view_points_earned(100, 100, 10), 1);
        assert_eq!(view_points_earned(850, 100, 10), 8);
    }

    #[test]
    fn test_cap_is_enforced() {
        assert_eq!(view_points_earned(5000, 100, 10), 10);
        assert_eq!(view_points_earned(1_000_000, 100, 10), 10);
        assert_eq!(view_points_earned(1000, 100, 10), 10);
    }

    #[test]
    fn test_incremental_delta() {
        // 500 views paid out 5 points; at 850 views the gap is exactly 3.
        let already_awarded = view_points_earned(500, 100, 10);
        assert_eq!(already_awarded, 5);
        let total = view_points_earned(850, 100, 10);
        assert_eq!(total - already_awarded, 3);
    }

    #[test]
    fn test_rerun_without_new_views_is_a_noop() {
        let first = view_points_earned(850, 100, 10);
        let second = view_points_earned(850, 100, 10);
        assert_eq!(second - first, 0);
    }

    #[test]
    fn test_misconfigured_ratio_earns_nothing() {
        assert_eq!(view_points_earned(5000, 0, 10), 0);
        assert_eq!(view_points_earned(5000, -1, 10), 0);
    }
}
