//! Background job scheduler.
//!
//! Registers the heartbeat and order-reminder jobs at server startup. Both
//! append to plain-text logs; failures are logged and never stop the
//! scheduler.

use std::sync::Arc;

use crm_jobs::HeartbeatClient;
use sqlx::PgPool;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

/// Every five minutes, on the minute.
const HEARTBEAT_CRON: &str = "0 */5 * * * *";
/// Daily at 08:00 UTC.
const REMINDERS_CRON: &str = "0 0 8 * * *";

/// Builds and starts the background job scheduler.
///
/// Returns the running [`JobScheduler`] handle, which must be kept alive
/// for the lifetime of the process. Dropping it shuts down all jobs.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if the scheduler cannot be initialised,
/// a job cannot be registered, or the scheduler fails to start.
pub async fn build_scheduler(
    pool: PgPool,
    config: Arc<crm_core::AppConfig>,
    heartbeat: HeartbeatClient,
) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;

    register_heartbeat_job(&scheduler, heartbeat, Arc::clone(&config)).await?;
    register_reminders_job(&scheduler, pool, config).await?;

    scheduler.start().await?;
    tracing::info!(
        heartbeat = HEARTBEAT_CRON,
        reminders = REMINDERS_CRON,
        "scheduler: jobs registered"
    );
    Ok(scheduler)
}

async fn register_heartbeat_job(
    scheduler: &JobScheduler,
    client: HeartbeatClient,
    config: Arc<crm_core::AppConfig>,
) -> Result<(), JobSchedulerError> {
    let client = Arc::new(client);

    let job = Job::new_async(HEARTBEAT_CRON, move |_uuid, _lock| {
        let client = Arc::clone(&client);
        let config = Arc::clone(&config);

        Box::pin(async move {
            if let Err(e) = crm_jobs::run_heartbeat(&client, &config.heartbeat_log_path).await {
                tracing::error!(error = %e, "scheduler: heartbeat failed");
            }
        })
    })?;

    scheduler.add(job).await?;
    Ok(())
}

async fn register_reminders_job(
    scheduler: &JobScheduler,
    pool: PgPool,
    config: Arc<crm_core::AppConfig>,
) -> Result<(), JobSchedulerError> {
    let pool = Arc::new(pool);

    let job = Job::new_async(REMINDERS_CRON, move |_uuid, _lock| {
        let pool = Arc::clone(&pool);
        let config = Arc::clone(&config);

        Box::pin(async move {
            tracing::info!("scheduler: starting order reminders run");
            match crm_jobs::run_order_reminders(
                &pool,
                &config.reminders_log_path,
                chrono::Utc::now(),
            )
            .await
            {
                Ok(count) => tracing::info!(count, "scheduler: order reminders run complete"),
                Err(e) => tracing::error!(error = %e, "scheduler: order reminders run failed"),
            }
        })
    })?;

    scheduler.add(job).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cron_expressions_parse() {
        for expr in [HEARTBEAT_CRON, REMINDERS_CRON] {
            Job::new_async(expr, |_uuid, _lock| Box::pin(async {}))
                .unwrap_or_else(|e| panic!("{expr}: {e}"));
        }
    }
}
