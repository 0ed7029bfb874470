//! Crawl triggers outside the API
//!
//! One cycle always runs at process start. With `[schedule] enabled = true`
//! (or `ENABLE_CRON=true`) a cron job repeats the cycle, daily at 02:00 UTC
//! unless configured otherwise.

use crate::config::ScheduleConfig;
use crate::sync::{CycleReport, CycleRunner, Trigger, TriggerOutcome};
use tokio_cron_scheduler::{Job, JobScheduler};

/// Runs the startup cycle
///
/// The caller decides what a failure means; the binary treats it as fatal.
pub async fn run_startup_cycle(runner: &CycleRunner) -> crate::Result<CycleReport> {
    tracing::info!("Running startup crawl");
    runner.run_now(Trigger::Startup).await
}

/// Starts the recurring crawl if the schedule is enabled
///
/// # Returns
///
/// * `Ok(Some(scheduler))` - The scheduler is running; keep it alive
/// * `Ok(None)` - Scheduling is disabled
/// * `Err(CatalogError)` - The cron expression was rejected or the scheduler failed to start
pub async fn start_scheduler(
    runner: CycleRunner,
    config: &ScheduleConfig,
) -> crate::Result<Option<JobScheduler>> {
    if !config.enabled {
        tracing::info!("Recurring crawl disabled");
        return Ok(None);
    }

    let scheduler = JobScheduler::new().await?;

    let job = Job::new_async(config.cron.as_str(), move |_uuid, _lock| {
        let runner = runner.clone();
        Box::pin(async move {
            scheduled_trigger(&runner);
        })
    })?;

    scheduler.add(job).await?;
    scheduler.start().await?;

    tracing::info!("Recurring crawl scheduled ({} UTC)", config.cron);
    Ok(Some(scheduler))
}

/// Fires one scheduled cycle, skipping it if a cycle is already running
///
/// Returns the outcome so callers can tell a skip from a start; errors are
/// logged and reported as `None`.
pub fn scheduled_trigger(runner: &CycleRunner) -> Option<TriggerOutcome> {
    match runner.try_start(Trigger::Scheduled) {
        Ok(outcome @ TriggerOutcome::Started { run_id }) => {
            tracing::info!("Scheduled crawl started as run {}", run_id);
            Some(outcome)
        }
        Ok(outcome @ TriggerOutcome::AlreadyRunning { run_id }) => {
            tracing::warn!(
                "Skipping scheduled crawl: run {:?} is still in progress",
                run_id
            );
            Some(outcome)
        }
        Err(e) => {
            tracing::error!("Scheduled crawl could not start: {}", e);
            None
        }
    }
}
