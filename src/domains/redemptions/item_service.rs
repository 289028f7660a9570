//! Catalog of redeemable items.

use sqlx::PgPool;
use tracing::info;

use super::models::{NewRedemptionItem, RedemptionError, RedemptionItem, RedemptionItemUpdate};

pub struct RedemptionItemService {
    db: PgPool,
}

impl RedemptionItemService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Active items in display order (the user-facing catalog).
    pub async fn list_active(&self) -> Result<Vec<RedemptionItem>, RedemptionError> {
        let items = sqlx::query_as::<_, RedemptionItem>(
            "SELECT * FROM redemption_items WHERE is_active = true ORDER BY sort_order, id",
        )
        .fetch_all(&self.db)
        .await?;

        Ok(items)
    }

    /// Every item, active or not (admin view).
    pub async fn list_all(&self) -> Result<Vec<RedemptionItem>, RedemptionError> {
        let items = sqlx::query_as::<_, RedemptionItem>(
            "SELECT * FROM redemption_items ORDER BY sort_order, id",
        )
        .fetch_all(&self.db)
        .await?;

        Ok(items)
    }

    pub async fn find(&self, item_id: i64) -> Result<RedemptionItem, RedemptionError> {
        sqlx::query_as::<_, RedemptionItem>("SELECT * FROM redemption_items WHERE id = $1")
            .bind(item_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or(RedemptionError::ItemNotFound)
    }

    pub async fn create(&self, input: NewRedemptionItem) -> Result<RedemptionItem, RedemptionError> {
        if input.point_cost <= 0 || input.rupiah_value <= 0 {
            return Err(RedemptionError::Validation(
                "point_cost dan rupiah_value harus lebih besar dari nol".to_string(),
            ));
        }

        let item = sqlx::query_as::<_, RedemptionItem>(
            r#"
            INSERT INTO redemption_items
                (name, description, point_cost, rupiah_value, is_active, sort_order)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.point_cost)
        .bind(input.rupiah_value)
        .bind(input.is_active)
        .bind(input.sort_order)
        .fetch_one(&self.db)
        .await?;

        info!("Created redemption item {} ('{}')", item.id, item.name);

        Ok(item)
    }

    /// Partial update; absent fields keep their current value. Existing
    /// requests are unaffected because they captured cost and value at
    /// submission time.
    pub async fn update(
        &self,
        item_id: i64,
        input: RedemptionItemUpdate,
    ) -> Result<RedemptionItem, RedemptionError> {
        if matches!(input.point_cost, Some(cost) if cost <= 0)
            || matches!(input.rupiah_value, Some(value) if value <= 0)
        {
            return Err(RedemptionError::Validation(
                "point_cost dan rupiah_value harus lebih besar dari nol".to_string(),
            ));
        }

        let item = sqlx::query_as::<_, RedemptionItem>(
            r#"
            UPDATE redemption_items
            SET name = COALESCE($1, name),
                description = COALESCE($2, description),
                point_cost = COALESCE($3, point_cost),
                rupiah_value = COALESCE($4, rupiah_value),
                sort_order = COALESCE($5, sort_order),
                updated_at = NOW()
            WHERE id = $6
            RETURNING *
            "#,
        )
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.point_cost)
        .bind(input.rupiah_value)
        .bind(input.sort_order)
        .bind(item_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or(RedemptionError::ItemNotFound)?;

        Ok(item)
    }

    pub async fn set_active(
        &self,
        item_id: i64,
        is_active: bool,
    ) -> Result<RedemptionItem, RedemptionError> {
        let item = sqlx::query_as::<_, RedemptionItem>(
            r#"
            UPDATE redemption_items
            SET is_active = $1, updated_at = NOW()
            WHERE id = $2
            RETURNING *
            "#,
        )
        .bind(is_active)
        .bind(item_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or(RedemptionError::ItemNotFound)?;

        info!(
            "Redemption item {} {}",
            item.id,
            if is_active { "activated" } else { "deactivated" }
        );

        Ok(item)
    }
}
