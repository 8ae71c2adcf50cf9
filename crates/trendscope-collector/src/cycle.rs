//! One collection cycle across the planned regions.

use chrono::NaiveDate;
use futures::stream::{self, StreamExt};
use trendscope_core::{
    dedup_first_seen, enrich, metadata_batches, normalize_cycle, ChannelSnapshot,
    RegionTrendingSet, TrendWindow,
};
use trendscope_store::Store;

use crate::error::CollectError;
use crate::plan::CyclePlan;
use crate::source::TrendingSource;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegionStatus {
    /// Videos were collected and folded into the store.
    Collected,
    /// No video came back; stored state is untouched.
    Empty,
    /// Every category request failed, or a store write failed.
    Failed(String),
}

/// What happened to one region during a cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionOutcome {
    pub region: String,
    pub status: RegionStatus,
    pub videos: usize,
    pub failed_categories: usize,
    pub hashtags: usize,
    /// Distinct channels among the region's trending videos.
    pub channels: usize,
    /// Channels dropped for lack of metadata.
    pub dropped_channels: usize,
    pub failed_batches: usize,
    pub histories_updated: usize,
    pub history_failures: usize,
    /// Channels not previously in the region's trending set.
    pub new_channels: usize,
}

impl RegionOutcome {
    fn new(region: &str) -> Self {
        Self {
            region: region.to_string(),
            status: RegionStatus::Empty,
            videos: 0,
            failed_categories: 0,
            hashtags: 0,
            channels: 0,
            dropped_channels: 0,
            failed_batches: 0,
            histories_updated: 0,
            history_failures: 0,
            new_channels: 0,
        }
    }

    fn failed(region: &str, reason: String) -> Self {
        Self {
            status: RegionStatus::Failed(reason),
            ..Self::new(region)
        }
    }

    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self.status, RegionStatus::Failed(_))
    }
}

/// Summary of one cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleReport {
    pub date: NaiveDate,
    pub window: TrendWindow,
    pub dry_run: bool,
    /// Per-region outcomes ordered by region code.
    pub regions: Vec<RegionOutcome>,
    /// Sum of every stored region set's size after the cycle.
    pub region_channels_total: usize,
    /// Distinct channels across every stored region set after the cycle.
    pub unique_channels: usize,
}

impl CycleReport {
    #[must_use]
    pub fn failed_regions(&self) -> usize {
        self.regions.iter().filter(|r| r.is_failed()).count()
    }

    #[must_use]
    pub fn collected_regions(&self) -> usize {
        self.regions
            .iter()
            .filter(|r| r.status == RegionStatus::Collected)
            .count()
    }
}

/// Run one collection cycle.
///
/// Regions run with up to `plan.max_concurrent_regions` in flight;
/// categories within a region run one after another. A failed category,
/// metadata batch, or channel history is logged and skipped. A region that
/// yields no videos leaves its stored state untouched.
///
/// # Errors
///
/// - [`CollectError::NoRegions`] if the plan has no regions.
/// - [`CollectError::AllRegionsFailed`] if no region succeeded.
/// - [`CollectError::Store`] if the stored sets cannot be read for the
///   closing tally.
pub async fn run_cycle<S>(
    source: &S,
    store: &Store,
    plan: &CyclePlan,
) -> Result<CycleReport, CollectError>
where
    S: TrendingSource + ?Sized,
{
    if plan.regions.is_empty() {
        return Err(CollectError::NoRegions);
    }

    tracing::info!(
        regions = plan.regions.len(),
        categories = plan.categories.len(),
        date = %plan.date,
        window = %plan.window,
        dry_run = plan.dry_run,
        "collect: cycle started"
    );

    let max_concurrent = plan.max_concurrent_regions.max(1);
    // Owned region codes keep the per-region future `Send` for any lifetime.
    let mut outcomes: Vec<RegionOutcome> = stream::iter(plan.regions.iter().cloned())
        .map(|region| async move {
            match process_region(source, store, plan, &region).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    tracing::error!(region = %region, error = %e, "collect: region failed");
                    RegionOutcome::failed(&region, e.to_string())
                }
            }
        })
        .buffer_unordered(max_concurrent)
        .collect()
        .await;
    outcomes.sort_by(|a, b| a.region.cmp(&b.region));

    let failed = outcomes.iter().filter(|o| o.is_failed()).count();
    if failed > 0 {
        tracing::warn!(failed, total = outcomes.len(), "collect: some regions failed");
    }
    if failed == outcomes.len() {
        return Err(CollectError::AllRegionsFailed { failed });
    }

    let sets = store.load_all_trending().await?;
    let region_channels_total = sets.iter().map(|(_, set)| set.len()).sum();
    let unique_channels =
        dedup_first_seen(sets.into_iter().map(|(_, set)| set.into_snapshots())).len();

    let report = CycleReport {
        date: plan.date,
        window: plan.window,
        dry_run: plan.dry_run,
        regions: outcomes,
        region_channels_total,
        unique_channels,
    };
    tracing::info!(
        collected = report.collected_regions(),
        failed,
        unique_channels,
        region_channels_total,
        "collect: cycle completed"
    );
    Ok(report)
}

async fn process_region<S>(
    source: &S,
    store: &Store,
    plan: &CyclePlan,
    region: &str,
) -> Result<RegionOutcome, CollectError>
where
    S: TrendingSource + ?Sized,
{
    let mut outcome = RegionOutcome::new(region);

    let mut videos = Vec::new();
    for category in &plan.categories {
        match source.list_trending(region, category).await {
            Ok(batch) => {
                tracing::debug!(region, category = %category, count = batch.len(), "collect: category fetched");
                videos.extend(batch);
            }
            Err(e) => {
                tracing::warn!(region, category = %category, error = %e, "collect: category failed, skipping");
                outcome.failed_categories += 1;
            }
        }
    }

    if !plan.categories.is_empty() && outcome.failed_categories == plan.categories.len() {
        tracing::warn!(region, failed = outcome.failed_categories, "collect: every category failed");
        outcome.status = RegionStatus::Failed(format!(
            "all {} category requests failed",
            outcome.failed_categories
        ));
        return Ok(outcome);
    }
    if videos.is_empty() {
        tracing::info!(region, "collect: no videos, region left untouched");
        return Ok(outcome);
    }

    let digest = normalize_cycle(&videos, plan.date);
    outcome.videos = digest.total_videos;
    outcome.hashtags = digest.hashtags.len();
    outcome.channels = digest.channels.len();

    if !plan.dry_run {
        store.modify_hashtags(|table| table.merge(&digest.hashtags)).await?;
    }

    let ids: Vec<String> = digest.channels.iter().map(|c| c.channel_id.clone()).collect();
    let mut metadata = Vec::with_capacity(ids.len());
    for batch in metadata_batches(&ids) {
        match source.channel_metadata(batch).await {
            Ok(found) => metadata.extend(found),
            Err(e) => {
                tracing::warn!(region, batch = batch.len(), error = %e, "collect: metadata batch failed, skipping");
                outcome.failed_batches += 1;
            }
        }
    }

    let snapshots = enrich(&digest.channels, &metadata);
    outcome.dropped_channels = digest.channels.len() - snapshots.len();

    if plan.dry_run {
        outcome.new_channels = count_new(&store.load_trending(region).await?, &snapshots);
        outcome.status = RegionStatus::Collected;
        return Ok(outcome);
    }

    update_histories(store, plan, region, &snapshots, &mut outcome).await;

    outcome.new_channels = store
        .modify_trending(region, |set| set.upsert(snapshots))
        .await?;
    outcome.status = RegionStatus::Collected;

    tracing::info!(
        region,
        videos = outcome.videos,
        channels = outcome.channels,
        new_channels = outcome.new_channels,
        hashtags = outcome.hashtags,
        "collect: region done"
    );
    Ok(outcome)
}

/// Roll each snapshot into its channel history. Failures are counted and
/// skipped.
async fn update_histories(
    store: &Store,
    plan: &CyclePlan,
    region: &str,
    snapshots: &[ChannelSnapshot],
    outcome: &mut RegionOutcome,
) {
    for snapshot in snapshots {
        let result = store
            .modify_history(&snapshot.channel_id, |history| {
                let rolled = history.apply(snapshot)?;
                plan.retention.enforce(history);
                Ok::<_, CollectError>(rolled)
            })
            .await;
        match result {
            Ok(rolled) => {
                outcome.histories_updated += 1;
                if rolled.month_opened || rolled.quarter_opened {
                    tracing::debug!(
                        channel_id = %snapshot.channel_id,
                        month_opened = rolled.month_opened,
                        quarter_opened = rolled.quarter_opened,
                        "collect: new rollup period"
                    );
                }
            }
            Err(e) => {
                tracing::warn!(region, channel_id = %snapshot.channel_id, error = %e, "collect: history update failed");
                outcome.history_failures += 1;
            }
        }
    }
}

fn count_new(existing: &RegionTrendingSet, snapshots: &[ChannelSnapshot]) -> usize {
    snapshots
        .iter()
        .filter(|s| existing.get(&s.channel_id).is_none())
        .count()
}
