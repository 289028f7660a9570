//! Runtime settings backed by the `settings` table.
//!
//! Read path is cached in-process with a TTL so the accrual job and the
//! eligibility checks do not hit the database on every call. Writes upsert
//! the row and drop the cached key, so the next read sees the committed
//! value within the TTL staleness window.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use std::time::{Duration, Instant};
use tracing::warn;

/// Cached settings expire after one hour, matching the admin panel's
/// expectation that parameter changes roll out "within the hour".
const SETTINGS_CACHE_TTL_SECONDS: u64 = 3600;

/// Keys the rewards core reads.
pub mod keys {
    pub const VIEWS_PER_POINT: &str = "views_per_point";
    pub const MAX_POINTS_PER_ARTICLE: &str = "max_points_per_article";
    pub const MAX_PENDING_REQUESTS: &str = "max_pending_requests";
    pub const REDEMPTION_COOLDOWN_HOURS: &str = "redemption_cooldown_hours";
}

/// Defaults used when a key is unset or unparseable.
pub mod defaults {
    pub const VIEWS_PER_POINT: i64 = 100;
    pub const MAX_POINTS_PER_ARTICLE: i64 = 10;
    pub const MAX_PENDING_REQUESTS: i64 = 1;
    pub const REDEMPTION_COOLDOWN_HOURS: i64 = 24;
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Setting {
    pub key: String,
    pub value: String,
    pub group: String,
    pub description: Option<String>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone)]
struct CachedSetting {
    value: Option<String>,
    expires_at: Instant,
}

pub struct SettingsService {
    db: PgPool,
    cache: DashMap<String, CachedSetting>,
}

impl SettingsService {
    pub fn new(db: PgPool) -> Self {
        Self {
            db,
            cache: DashMap::new(),
        }
    }

    /// Get a raw setting value. Misses (key not present) are cached too.
    pub async fn get(&self, key: &str) -> Result<Option<String>, sqlx::Error> {
        if let Some(entry) = self.cache.get(key) {
            if entry.expires_at > Instant::now() {
                return Ok(entry.value.clone());
            }
        }

        let value: Option<String> =
            sqlx::query_scalar("SELECT value FROM settings WHERE key = $1")
                .bind(key)
                .fetch_optional(&self.db)
                .await?;

        self.cache.insert(
            key.to_string(),
            CachedSetting {
                value: value.clone(),
                expires_at: Instant::now() + Duration::from_secs(SETTINGS_CACHE_TTL_SECONDS),
            },
        );

        Ok(value)
    }

    /// Get a setting coerced to an integer, falling back to `default` when
    /// the key is unset or does not parse.
    pub async fn get_int(&self, key: &str, default: i64) -> Result<i64, sqlx::Error> {
        let raw = self.get(key).await?;
        if let Some(raw) = raw.as_deref() {
            if raw.trim().parse::<i64>().is_err() {
                warn!("Setting '{}' is not an integer, using default {}", key, default);
            }
        }
        Ok(coerce_int(raw.as_deref(), default))
    }

    /// Upsert a setting and invalidate its cached value.
    pub async fn set(&self, key: &str, value: &str, group: &str) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO settings (key, value, "group", updated_at)
            VALUES ($1, $2, $3, NOW())
            ON CONFLICT (key)
            DO UPDATE SET value = EXCLUDED.value, "group" = EXCLUDED."group", updated_at = NOW()
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(group)
        .execute(&self.db)
        .await?;

        self.cache.remove(key);

        Ok(())
    }

    /// List settings, optionally scoped to a group (admin read path).
    pub async fn list(&self, group: Option<&str>) -> Result<Vec<Setting>, sqlx::Error> {
        match group {
            Some(group) => {
                sqlx::query_as::<_, Setting>(
                    r#"SELECT key, value, "group", description, updated_at
                       FROM settings WHERE "group" = $1 ORDER BY key"#,
                )
                .bind(group)
                .fetch_all(&self.db)
                .await
            }
            None => {
                sqlx::query_as::<_, Setting>(
                    r#"SELECT key, value, "group", description, updated_at
                       FROM settings ORDER BY "group", key"#,
                )
                .fetch_all(&self.db)
                .await
            }
        }
    }

    /// Drop every cached entry.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }
}

fn coerce_int(raw: Option<&str>, default: i64) -> i64 {
    raw.and_then(|v| v.trim().parse::<i64>().ok()).unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coerce_int_parses_value() {
        assert_eq!(coerce_int(Some("150"), 100), 150);
        assert_eq!(coerce_int(Some(" 25 "), 100), 25);
        assert_eq!(coerce_int(Some("-3"), 100), -3);
    }

    #[test]
    fn test_coerce_int_falls_back_to_default() {
        assert_eq!(coerce_int(None, 100), 100);
        assert_eq!(coerce_int(Some(""), 10), 10);
        assert_eq!(coerce_int(Some("abc"), 24), 24);
        assert_eq!(coerce_int(Some("12.5"), 24), 24);
    }
}
