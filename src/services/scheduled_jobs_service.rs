// ============================================================================
// SCHEDULED JOBS SERVICE - Cron-driven background work
// ============================================================================

use anyhow::Result;
use sqlx::PgPool;
use std::sync::{Arc, OnceLock};
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info, warn};

use crate::domains::points::ViewPointService;
use crate::settings::SettingsService;

/// Advisory lock key for the view-point pass. One run at a time across
/// every instance.
const VIEW_POINTS_LOCK_KEY: i64 = 729_415;

pub struct ScheduledJobsService {
    scheduler: JobScheduler,
    db: PgPool,
    settings: Arc<SettingsService>,
}

impl ScheduledJobsService {
    pub async fn new(db: PgPool, settings: Arc<SettingsService>) -> Result<Self> {
        let scheduler = JobScheduler::new().await?;

        Ok(Self {
            scheduler,
            db,
            settings,
        })
    }

    pub async fn start(&self) -> Result<()> {
        info!("Starting scheduled jobs...");

        // Job 1: reconcile view counts into point awards (hourly)
        self.add_view_points_job().await?;

        self.scheduler.start().await?;

        info!("All scheduled jobs started successfully");
        Ok(())
    }

    async fn add_view_points_job(&self) -> Result<()> {
        let db = self.db.clone();
        let settings = self.settings.clone();

        let job = Job::new_async("0 0 * * * *", move |_uuid, _l| {
            let db = db.clone();
            let settings = settings.clone();
            Box::pin(async move {
                info!("Running view_points job...");

                match run_view_points_pass(&db, settings).await {
                    Ok(count) => info!("View point pass awarded points on {} posts", count),
                    Err(e) => error!("Error running view point pass: {}", e),
                }
            })
        })?;

        self.scheduler.add(job).await?;
        info!("Added view_points job (hourly)");
        Ok(())
    }

    pub async fn shutdown(&mut self) -> Result<()> {
        info!("Shutting down scheduled jobs...");
        self.scheduler.shutdown().await?;
        Ok(())
    }
}

// ============================================================================
// JOB IMPLEMENTATIONS
// ============================================================================

/// One accrual pass, guarded by a session-level advisory lock. The lock is
/// taken and released on a dedicated connection held for the whole pass;
/// if another instance holds it, this tick is skipped.
pub async fn run_view_points_pass(db: &PgPool, settings: Arc<SettingsService>) -> Result<u64> {
    let mut conn = db.acquire().await?;

    let locked: bool = sqlx::query_scalar("SELECT pg_try_advisory_lock($1)")
        .bind(VIEW_POINTS_LOCK_KEY)
        .fetch_one(&mut *conn)
        .await?;

    if !locked {
        warn!("View point pass already running elsewhere, skipping this tick");
        return Ok(0);
    }

    let service = ViewPointService::new(db.clone(), settings);
    let result = service.run().await;

    let _: std::result::Result<bool, sqlx::Error> =
        sqlx::query_scalar("SELECT pg_advisory_unlock($1)")
            .bind(VIEW_POINTS_LOCK_KEY)
            .fetch_one(&mut *conn)
            .await;

    Ok(result?)
}

// ============================================================================
// SHARED INSTANCE
// ============================================================================

static SCHEDULED_JOBS: OnceLock<Arc<ScheduledJobsService>> = OnceLock::new();

pub async fn init_scheduled_jobs(db: PgPool, settings: Arc<SettingsService>) -> Result<()> {
    let service = Arc::new(ScheduledJobsService::new(db, settings).await?);
    service.start().await?;

    if SCHEDULED_JOBS.set(service).is_err() {
        error!("Scheduled jobs already initialized");
    }

    Ok(())
}

pub fn get_scheduled_jobs() -> Option<Arc<ScheduledJobsService>> {
    SCHEDULED_JOBS.get().cloned()
}
