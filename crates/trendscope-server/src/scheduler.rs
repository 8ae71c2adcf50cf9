//! Background job scheduler.
//!
//! Registers the trending collection cycle and the directory refresh as cron
//! jobs. Both share one run lock, so a slow cycle makes the next trigger skip
//! instead of overlapping with it.

use std::sync::Arc;

use tokio::sync::Mutex;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};
use trendscope_collector::{refresh_directory, run_cycle, CyclePlan};
use trendscope_core::AppConfig;
use trendscope_store::Store;
use trendscope_youtube::{ApiKeyPool, ClientSettings, YoutubeClient};

const DEFAULT_COLLECT_CRON: &str = "0 0 12,23 * * *";
const DEFAULT_DIRECTORY_CRON: &str = "0 30 23 * * *";

/// Whether `TRENDSCOPE_SCHEDULER_ENABLED` leaves scheduling on (the default).
#[must_use]
pub fn scheduler_enabled() -> bool {
    std::env::var("TRENDSCOPE_SCHEDULER_ENABLED")
        .map_or(true, |v| !matches!(v.trim().to_ascii_lowercase().as_str(), "false" | "0" | "no" | "off"))
}

/// Builds and starts the background job scheduler.
///
/// Returns the running [`JobScheduler`] handle, which must be kept alive
/// for the lifetime of the process. Dropping it shuts down all jobs.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if the scheduler cannot be initialised,
/// a cron expression is invalid, or the scheduler fails to start.
pub async fn build_scheduler(
    store: Store,
    config: Arc<AppConfig>,
) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;
    let run_lock = Arc::new(Mutex::new(()));

    register_collect_job(&scheduler, store.clone(), Arc::clone(&config), Arc::clone(&run_lock))
        .await?;
    register_directory_job(&scheduler, store, config, run_lock).await?;

    scheduler.start().await?;
    Ok(scheduler)
}

/// Register the trending collection cycle.
///
/// Runs at 12:00 and 23:00 UTC by default and can be overridden with
/// `TRENDSCOPE_COLLECT_CRON`.
async fn register_collect_job(
    scheduler: &JobScheduler,
    store: Store,
    config: Arc<AppConfig>,
    run_lock: Arc<Mutex<()>>,
) -> Result<(), JobSchedulerError> {
    let cron = std::env::var("TRENDSCOPE_COLLECT_CRON")
        .unwrap_or_else(|_| DEFAULT_COLLECT_CRON.to_string());

    let job = Job::new_async(cron.as_str(), move |_uuid, _lock| {
        let store = store.clone();
        let config = Arc::clone(&config);
        let run_lock = Arc::clone(&run_lock);

        Box::pin(async move {
            let Ok(_guard) = run_lock.try_lock() else {
                tracing::warn!("scheduler: previous run still in progress; skipping collect");
                return;
            };
            tracing::info!("scheduler: starting collection cycle");
            run_collect_job(&store, &config).await;
            tracing::info!("scheduler: collection cycle complete");
        })
    })?;

    scheduler.add(job).await?;
    tracing::info!(cron = %cron, "scheduler: registered collect job");
    Ok(())
}

/// Register the channel directory refresh.
///
/// Runs at 23:30 UTC by default and can be overridden with
/// `TRENDSCOPE_DIRECTORY_CRON`.
async fn register_directory_job(
    scheduler: &JobScheduler,
    store: Store,
    config: Arc<AppConfig>,
    run_lock: Arc<Mutex<()>>,
) -> Result<(), JobSchedulerError> {
    let cron = std::env::var("TRENDSCOPE_DIRECTORY_CRON")
        .unwrap_or_else(|_| DEFAULT_DIRECTORY_CRON.to_string());

    let job = Job::new_async(cron.as_str(), move |_uuid, _lock| {
        let store = store.clone();
        let config = Arc::clone(&config);
        let run_lock = Arc::clone(&run_lock);

        Box::pin(async move {
            let Ok(_guard) = run_lock.try_lock() else {
                tracing::warn!("scheduler: previous run still in progress; skipping directory refresh");
                return;
            };
            tracing::info!("scheduler: starting directory refresh");
            run_directory_job(&store, &config).await;
            tracing::info!("scheduler: directory refresh complete");
        })
    })?;

    scheduler.add(job).await?;
    tracing::info!(cron = %cron, "scheduler: registered directory job");
    Ok(())
}

/// Keys and regions are re-read on every run so edits apply without a restart.
fn build_client(config: &AppConfig) -> Option<YoutubeClient> {
    let keys = match trendscope_core::load_api_keys(config) {
        Ok(keys) => keys,
        Err(e) => {
            tracing::error!(error = %e, "scheduler: no API keys available");
            return None;
        }
    };
    let client = ApiKeyPool::new(&keys)
        .and_then(|pool| YoutubeClient::new(pool, ClientSettings::from_config(config)));
    match client {
        Ok(client) => Some(client),
        Err(e) => {
            tracing::error!(error = %e, "scheduler: failed to build YouTube client");
            None
        }
    }
}

async fn run_collect_job(store: &Store, config: &AppConfig) {
    let regions = match trendscope_core::load_regions(&config.regions_path) {
        Ok(regions) => regions,
        Err(e) => {
            tracing::error!(error = %e, "scheduler: failed to load regions");
            return;
        }
    };
    let Some(client) = build_client(config) else {
        return;
    };

    let plan = CyclePlan::new(&regions, config, chrono::Local::now().naive_local());
    match run_cycle(&client, store, &plan).await {
        Ok(report) => tracing::info!(
            date = %report.date,
            window = %report.window,
            collected = report.collected_regions(),
            failed = report.failed_regions(),
            unique_channels = report.unique_channels,
            "scheduler: cycle finished"
        ),
        Err(e) => tracing::error!(error = %e, "scheduler: cycle failed"),
    }
}

async fn run_directory_job(store: &Store, config: &AppConfig) {
    let Some(client) = build_client(config) else {
        return;
    };

    match refresh_directory(&client, store, &[], false).await {
        Ok(report) => tracing::info!(
            regions = report.regions.len(),
            added = report.added(),
            "scheduler: directory refresh finished"
        ),
        Err(e) => tracing::error!(error = %e, "scheduler: directory refresh failed"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_cron_expressions_parse() {
        for cron in [DEFAULT_COLLECT_CRON, DEFAULT_DIRECTORY_CRON] {
            let job = Job::new_async(cron, |_uuid, _lock| Box::pin(async {}));
            assert!(job.is_ok(), "{cron} should parse");
        }
    }
}
