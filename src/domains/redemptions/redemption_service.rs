//! Redemption workflow: submission and admin status updates.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::info;

use super::eligibility::EligibilitySnapshot;
use super::models::{
    PaymentDetails, RedemptionError, RedemptionItem, RedemptionRequest, RedemptionStatus,
};
use crate::domains::points::{PointService, PointType};
use crate::settings::{defaults, keys, SettingsService};

const REQUEST_COLUMNS: &str = "id, user_id, redemption_item_id, point_cost, rupiah_value, \
    payment_method, bank_name, account_number, account_holder, \
    ewallet_provider, ewallet_number, ewallet_name, \
    status, admin_note, processed_by, processed_at, created_at, updated_at";

pub struct RedemptionService {
    db: PgPool,
    settings: Arc<SettingsService>,
}

impl RedemptionService {
    pub fn new(db: PgPool, settings: Arc<SettingsService>) -> Self {
        Self { db, settings }
    }

    /// Submit a new redemption request. Deducts the item's point cost and
    /// creates the `pending` request in one transaction; the eligibility
    /// checks run again on locked rows inside that transaction so a
    /// concurrent submission cannot slip past them.
    pub async fn submit(
        &self,
        user_id: i64,
        item_id: i64,
        payment: PaymentDetails,
    ) -> Result<RedemptionRequest, RedemptionError> {
        // 1. Load the catalog item
        let item = sqlx::query_as::<_, RedemptionItem>(
            "SELECT * FROM redemption_items WHERE id = $1",
        )
        .bind(item_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or(RedemptionError::ItemNotFound)?;

        if !item.is_active {
            return Err(RedemptionError::ItemInactive);
        }

        let max_pending = self
            .settings
            .get_int(keys::MAX_PENDING_REQUESTS, defaults::MAX_PENDING_REQUESTS)
            .await?;
        let cooldown_hours = self
            .settings
            .get_int(
                keys::REDEMPTION_COOLDOWN_HOURS,
                defaults::REDEMPTION_COOLDOWN_HOURS,
            )
            .await?;

        // 2. Fail-fast balance check without a lock
        let balance: Option<i32> = sqlx::query_scalar("SELECT points FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.db)
            .await?;
        if let Some(balance) = balance {
            if balance < item.point_cost {
                return Err(RedemptionError::InsufficientPoints {
                    required: item.point_cost,
                    available: balance,
                });
            }
        }

        // 3. Deduct and create inside one transaction
        let mut tx = self.db.begin().await?;

        // Lock the user row first; the re-checked snapshot and the
        // deduction then see the same committed balance.
        let locked_balance: Option<i32> =
            sqlx::query_scalar("SELECT points FROM users WHERE id = $1 FOR UPDATE")
                .bind(user_id)
                .fetch_optional(&mut *tx)
                .await?;
        let locked_balance = locked_balance
            .ok_or_else(|| RedemptionError::Database(format!("user {user_id} not found")))?;

        let outstanding_count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM redemption_requests
            WHERE user_id = $1 AND status IN ('pending', 'processing')
            "#,
        )
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        let last_request_at: Option<DateTime<Utc>> = sqlx::query_scalar(
            r#"
            SELECT created_at
            FROM redemption_requests
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;

        let snapshot = EligibilitySnapshot {
            balance: locked_balance,
            point_cost: item.point_cost,
            outstanding_count,
            max_pending,
            last_request_at,
            cooldown_hours,
        };
        snapshot.check(Utc::now())?;

        PointService::deduct_in_tx(
            &mut tx,
            user_id,
            item.point_cost,
            PointType::Redemption,
            &format!("Penukaran poin: {}", item.name),
            None,
        )
        .await?;

        let (method, bank_name, account_number, account_holder, ew_provider, ew_number, ew_name) =
            payment.into_columns();

        let query = format!(
            r#"
            INSERT INTO redemption_requests
                (user_id, redemption_item_id, point_cost, rupiah_value, payment_method,
                 bank_name, account_number, account_holder,
                 ewallet_provider, ewallet_number, ewallet_name, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, 'pending')
            RETURNING {REQUEST_COLUMNS}
            "#
        );
        let request = sqlx::query_as::<_, RedemptionRequest>(&query)
            .bind(user_id)
            .bind(item.id)
            .bind(item.point_cost)
            .bind(item.rupiah_value)
            .bind(method.as_str())
            .bind(bank_name)
            .bind(account_number)
            .bind(account_holder)
            .bind(ew_provider)
            .bind(ew_number)
            .bind(ew_name)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(
            "Created redemption request {} for user {} (item '{}', {} points)",
            request.id, user_id, item.name, item.point_cost
        );

        Ok(request)
    }

    /// Admin status update. Rejection refunds the captured point cost in
    /// the same transaction as the status write.
    pub async fn update_status(
        &self,
        request_id: i64,
        new_status: RedemptionStatus,
        admin_id: i64,
        admin_note: Option<&str>,
    ) -> Result<RedemptionRequest, RedemptionError> {
        let mut tx = self.db.begin().await?;

        let request = sqlx::query_as::<_, RedemptionRequest>(
            "SELECT * FROM redemption_requests WHERE id = $1 FOR UPDATE",
        )
        .bind(request_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(RedemptionError::RequestNotFound)?;

        let current = request.status().ok_or_else(|| {
            RedemptionError::Database(format!(
                "request {} has unknown status '{}'",
                request.id, request.status
            ))
        })?;

        if !current.can_transition_to(new_status) {
            return Err(RedemptionError::InvalidStatusTransition {
                from: current.as_str().to_string(),
                to: new_status.as_str().to_string(),
            });
        }

        if new_status == RedemptionStatus::Rejected {
            PointService::award_in_tx(
                &mut tx,
                request.user_id,
                request.point_cost,
                PointType::Refund,
                &format!("Pengembalian poin: permintaan #{} ditolak", request.id),
                None,
            )
            .await?;
        }

        let query = format!(
            r#"
            UPDATE redemption_requests
            SET status = $1,
                admin_note = $2,
                processed_by = $3,
                processed_at = NOW(),
                updated_at = NOW()
            WHERE id = $4
            RETURNING {REQUEST_COLUMNS}
            "#
        );
        let updated = sqlx::query_as::<_, RedemptionRequest>(&query)
            .bind(new_status.as_str())
            .bind(admin_note)
            .bind(admin_id)
            .bind(request_id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(
            "Redemption request {} moved {} -> {} by admin {}",
            request_id,
            current.as_str(),
            new_status.as_str(),
            admin_id
        );

        Ok(updated)
    }

    /// A user's own requests, newest first.
    pub async fn user_history(
        &self,
        user_id: i64,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<RedemptionRequest>, RedemptionError> {
        let query = format!(
            r#"
            SELECT {REQUEST_COLUMNS}
            FROM redemption_requests
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "#
        );
        let requests = sqlx::query_as::<_, RedemptionRequest>(&query)
            .bind(user_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.db)
            .await?;

        Ok(requests)
    }

    /// Admin listing with an optional status filter, oldest pending first.
    pub async fn admin_list(
        &self,
        status: Option<RedemptionStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<RedemptionRequest>, RedemptionError> {
        let requests = match status {
            Some(status) => {
                let query = format!(
                    r#"
                    SELECT {REQUEST_COLUMNS}
                    FROM redemption_requests
                    WHERE status = $1
                    ORDER BY created_at ASC, id ASC
                    LIMIT $2 OFFSET $3
                    "#
                );
                sqlx::query_as::<_, RedemptionRequest>(&query)
                    .bind(status.as_str())
                    .bind(limit)
                    .bind(offset)
                    .fetch_all(&self.db)
                    .await?
            }
            None => {
                let query = format!(
                    r#"
                    SELECT {REQUEST_COLUMNS}
                    FROM redemption_requests
                    ORDER BY created_at DESC, id DESC
                    LIMIT $1 OFFSET $2
                    "#
                );
                sqlx::query_as::<_, RedemptionRequest>(&query)
                    .bind(limit)
                    .bind(offset)
                    .fetch_all(&self.db)
                    .await?
            }
        };

        Ok(requests)
    }
}
