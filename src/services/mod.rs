pub mod scheduled_jobs_service;

pub use scheduled_jobs_service::{init_scheduled_jobs, ScheduledJobsService};
