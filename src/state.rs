use sqlx::PgPool;
use std::sync::Arc;

use crate::config::Config;
use crate::db::create_db_pool;
use crate::domains::points::PointService;
use crate::domains::redemptions::{RedemptionItemService, RedemptionService};
use crate::settings::SettingsService;

/// Shared application state: the connection pool, the settings store and
/// the domain services built over them.
pub struct AppState {
    pub config: Config,
    pub db_pool: PgPool,
    pub settings: Arc<SettingsService>,
    pub point_service: PointService,
    pub redemption_service: RedemptionService,
    pub item_service: RedemptionItemService,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        let config = Config::from_env()?;
        let db_pool = create_db_pool(&config.database).await?;

        let settings = Arc::new(SettingsService::new(db_pool.clone()));
        let point_service = PointService::new(db_pool.clone());
        let redemption_service = RedemptionService::new(db_pool.clone(), settings.clone());
        let item_service = RedemptionItemService::new(db_pool.clone());

        Ok(AppState {
            config,
            db_pool,
            settings,
            point_service,
            redemption_service,
            item_service,
        })
    }
}
