//! Collection command handlers for the CLI.
//!
//! Per-region, per-category and per-batch failures are logged inside the
//! collector and skipped; only configuration errors and a cycle in which
//! every region failed reach the caller.

use anyhow::Context;
use trendscope_collector::{refresh_directory, run_cycle, CyclePlan, RegionStatus};
use trendscope_core::AppConfig;
use trendscope_store::Store;
use trendscope_youtube::{ApiKeyPool, ClientSettings, YoutubeClient};

/// Build the platform client from the configured key sources.
fn build_client(config: &AppConfig) -> anyhow::Result<YoutubeClient> {
    let keys = trendscope_core::load_api_keys(config)?;
    let pool = ApiKeyPool::new(&keys)?;
    YoutubeClient::new(pool, ClientSettings::from_config(config))
        .context("failed to build YouTube client")
}

/// Run one collection cycle and print a per-region summary.
///
/// # Errors
///
/// Returns an error if the regions file or API keys cannot be loaded, a
/// requested region is not configured, or every region fails.
pub(crate) async fn run_collect(
    config: &AppConfig,
    store: &Store,
    regions: &[String],
    dry_run: bool,
) -> anyhow::Result<()> {
    let regions_file = trendscope_core::load_regions(&config.regions_path)?;
    let plan = CyclePlan::new(&regions_file, config, chrono::Local::now().naive_local())
        .with_regions(regions)
        .dry_run(dry_run);
    if plan.regions.is_empty() {
        anyhow::bail!(
            "none of [{}] is a configured region; see {}",
            regions.join(", "),
            config.regions_path.display()
        );
    }

    let client = build_client(config)?;
    tracing::info!(regions = plan.regions.len(), dry_run, "cli: starting collection cycle");
    let report = run_cycle(&client, store, &plan).await?;

    let prefix = if report.dry_run { "dry-run: " } else { "" };
    println!(
        "{prefix}cycle {} ({} window): {} regions, {} failed",
        report.date,
        report.window,
        report.regions.len(),
        report.failed_regions()
    );
    println!(
        "{:<8}{:<10}{:>8}{:>10}{:>8}{:>10}",
        "REGION", "STATUS", "VIDEOS", "CHANNELS", "NEW", "HASHTAGS"
    );
    for outcome in &report.regions {
        let status = match &outcome.status {
            RegionStatus::Collected => "ok",
            RegionStatus::Empty => "empty",
            RegionStatus::Failed(_) => "failed",
        };
        println!(
            "{:<8}{:<10}{:>8}{:>10}{:>8}{:>10}",
            outcome.region,
            status,
            outcome.videos,
            outcome.channels,
            outcome.new_channels,
            outcome.hashtags
        );
    }
    println!(
        "{} unique channels across all regions ({} region entries)",
        report.unique_channels, report.region_channels_total
    );

    Ok(())
}

/// Refresh the per-region channel directories and print what was added.
///
/// # Errors
///
/// Returns an error if API keys are missing or the store cannot be read or
/// written.
pub(crate) async fn run_directory(
    config: &AppConfig,
    store: &Store,
    regions: &[String],
    dry_run: bool,
) -> anyhow::Result<()> {
    let regions: Vec<String> = regions.iter().map(|r| r.to_ascii_uppercase()).collect();
    let client = build_client(config)?;
    tracing::info!(regions = regions.len(), dry_run, "cli: starting directory refresh");
    let report = refresh_directory(&client, store, &regions, dry_run).await?;

    if report.regions.is_empty() {
        println!("no trending data yet; run `trendscope collect` first");
        return Ok(());
    }

    let verb = if report.dry_run { "would add" } else { "added" };
    for outcome in &report.regions {
        println!(
            "{}: {verb} {} of {} missing channels{}",
            outcome.region,
            outcome.added,
            outcome.missing,
            if outcome.failed_batches > 0 {
                format!(" ({} batches failed)", outcome.failed_batches)
            } else {
                String::new()
            }
        );
    }
    println!("{verb} {} channels in total", report.added());

    Ok(())
}
