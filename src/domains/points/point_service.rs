//! The point ledger: the only writer of `users.points`.
//!
//! Every balance mutation is paired with a `point_logs` row in the same
//! transaction. Deductions take the user row `FOR UPDATE` before checking
//! the balance, so two concurrent deductions cannot both spend the same
//! points.

use sqlx::{PgPool, Postgres, Transaction};
use tracing::info;

use super::models::{PointError, PointLog, PointType};

pub struct PointService {
    db: PgPool,
}

impl PointService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Award points to a user in its own transaction.
    pub async fn award(
        &self,
        user_id: i64,
        amount: i32,
        point_type: PointType,
        reason: &str,
        post_id: Option<i64>,
    ) -> Result<PointLog, PointError> {
        let mut tx = self.db.begin().await?;
        let log = Self::award_in_tx(&mut tx, user_id, amount, point_type, reason, post_id).await?;
        tx.commit().await?;

        info!(
            "Awarded {} points ({}) to user {}",
            amount,
            point_type.as_str(),
            user_id
        );

        Ok(log)
    }

    /// Deduct points from a user in its own transaction.
    pub async fn deduct(
        &self,
        user_id: i64,
        amount: i32,
        point_type: PointType,
        reason: &str,
        post_id: Option<i64>,
    ) -> Result<PointLog, PointError> {
        let mut tx = self.db.begin().await?;
        let log = Self::deduct_in_tx(&mut tx, user_id, amount, point_type, reason, post_id).await?;
        tx.commit().await?;

        info!(
            "Deducted {} points ({}) from user {}",
            amount,
            point_type.as_str(),
            user_id
        );

        Ok(log)
    }

    /// Award inside a caller-owned transaction, so a caller can make the
    /// award atomic with its own writes (refund + status update, accrual
    /// bookkeeping).
    pub async fn award_in_tx(
        tx: &mut Transaction<'_, Postgres>,
        user_id: i64,
        amount: i32,
        point_type: PointType,
        reason: &str,
        post_id: Option<i64>,
    ) -> Result<PointLog, PointError> {
        if amount <= 0 {
            return Err(PointError::InvalidAmount { amount });
        }

        let log = Self::insert_log(tx, user_id, amount, point_type, reason, post_id).await?;

        let updated = sqlx::query("UPDATE users SET points = points + $1 WHERE id = $2")
            .bind(amount)
            .bind(user_id)
            .execute(&mut **tx)
            .await?;

        if updated.rows_affected() == 0 {
            return Err(PointError::UserNotFound);
        }

        Ok(log)
    }

    /// Deduct inside a caller-owned transaction. Locks the user row before
    /// the balance check; the check and the decrement therefore see the
    /// same committed balance.
    pub async fn deduct_in_tx(
        tx: &mut Transaction<'_, Postgres>,
        user_id: i64,
        amount: i32,
        point_type: PointType,
        reason: &str,
        post_id: Option<i64>,
    ) -> Result<PointLog, PointError> {
        if amount <= 0 {
            return Err(PointError::InvalidAmount { amount });
        }

        let balance: Option<i32> =
            sqlx::query_scalar("SELECT points FROM users WHERE id = $1 FOR UPDATE")
                .bind(user_id)
                .fetch_optional(&mut **tx)
                .await?;

        let balance = balance.ok_or(PointError::UserNotFound)?;

        if balance < amount {
            return Err(PointError::InsufficientPoints {
                required: amount,
                available: balance,
            });
        }

        let log = Self::insert_log(tx, user_id, -amount, point_type, reason, post_id).await?;

        sqlx::query("UPDATE users SET points = points - $1 WHERE id = $2")
            .bind(amount)
            .bind(user_id)
            .execute(&mut **tx)
            .await?;

        Ok(log)
    }

    /// Current balance of a user.
    pub async fn balance(&self, user_id: i64) -> Result<i32, PointError> {
        let balance: Option<i32> = sqlx::query_scalar("SELECT points FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.db)
            .await?;

        balance.ok_or(PointError::UserNotFound)
    }

    /// Ledger entries for a user, newest first.
    pub async fn history(
        &self,
        user_id: i64,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<PointLog>, PointError> {
        let entries = sqlx::query_as::<_, PointLog>(
            r#"
            SELECT id, user_id, post_id, points, type, reason, created_at
            FROM point_logs
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.db)
        .await?;

        Ok(entries)
    }

    async fn insert_log(
        tx: &mut Transaction<'_, Postgres>,
        user_id: i64,
        points: i32,
        point_type: PointType,
        reason: &str,
        post_id: Option<i64>,
    ) -> Result<PointLog, PointError> {
        let log = sqlx::query_as::<_, PointLog>(
            r#"
            INSERT INTO point_logs (user_id, post_id, points, type, reason)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, post_id, points, type, reason, created_at
            "#,
        )
        .bind(user_id)
        .bind(post_id)
        .bind(points)
        .bind(point_type.as_str())
        .bind(reason)
        .fetch_one(&mut **tx)
        .await?;

        Ok(log)
    }
}
