//! Tops up each region's channel directory with profiles for channels that
//! have trended there but are not listed yet.

use std::collections::HashSet;

use trendscope_core::{directory_additions, metadata_batches, ChannelProfile};
use trendscope_store::Store;

use crate::error::CollectError;
use crate::source::TrendingSource;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryRegionOutcome {
    pub region: String,
    /// Trending channels without a directory entry before the refresh.
    pub missing: usize,
    pub added: usize,
    pub failed_batches: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryReport {
    pub dry_run: bool,
    pub regions: Vec<DirectoryRegionOutcome>,
}

impl DirectoryReport {
    #[must_use]
    pub fn added(&self) -> usize {
        self.regions.iter().map(|r| r.added).sum()
    }
}

/// Fetch profiles for trending channels missing from each region's directory
/// and append them.
///
/// `regions` empty means every region with a stored trending set. Existing
/// entries are never rewritten. A failed metadata batch is logged and
/// skipped; its channels are picked up on the next refresh.
///
/// # Errors
///
/// [`CollectError::Store`] if a trending set or directory cannot be read or
/// written.
pub async fn refresh_directory<S>(
    source: &S,
    store: &Store,
    regions: &[String],
    dry_run: bool,
) -> Result<DirectoryReport, CollectError>
where
    S: TrendingSource + ?Sized,
{
    let regions = if regions.is_empty() {
        store.trending_regions().await?
    } else {
        regions.to_vec()
    };
    tracing::info!(regions = regions.len(), dry_run, "directory: refresh started");

    let mut report = DirectoryReport {
        dry_run,
        regions: Vec::with_capacity(regions.len()),
    };

    for region in &regions {
        let trending = store.load_trending(region).await?;
        let existing = store.load_directory(region).await?;
        let missing = directory_additions(&trending, &existing);

        let mut outcome = DirectoryRegionOutcome {
            region: region.clone(),
            missing: missing.len(),
            added: 0,
            failed_batches: 0,
        };

        let mut profiles: Vec<ChannelProfile> = Vec::with_capacity(missing.len());
        for batch in metadata_batches(&missing) {
            match source.channel_metadata(batch).await {
                Ok(found) => profiles.extend(found.into_iter().map(ChannelProfile::from)),
                Err(e) => {
                    tracing::warn!(region = %region, batch = batch.len(), error = %e, "directory: metadata batch failed, skipping");
                    outcome.failed_batches += 1;
                }
            }
        }

        if dry_run {
            outcome.added = profiles.len();
        } else if !profiles.is_empty() {
            outcome.added = store
                .modify_directory(region, |listed| append_new(listed, profiles))
                .await?;
        }

        tracing::info!(
            region = %region,
            missing = outcome.missing,
            added = outcome.added,
            "directory: region refreshed"
        );
        report.regions.push(outcome);
    }

    tracing::info!(added = report.added(), "directory: refresh completed");
    Ok(report)
}

/// Append profiles whose channel is not listed yet; returns how many landed.
fn append_new(listed: &mut Vec<ChannelProfile>, profiles: Vec<ChannelProfile>) -> usize {
    let mut known: HashSet<String> = listed.iter().map(|p| p.channel_id.clone()).collect();
    let before = listed.len();
    listed.extend(
        profiles
            .into_iter()
            .filter(|p| known.insert(p.channel_id.clone())),
    );
    listed.len() - before
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(id: &str) -> ChannelProfile {
        ChannelProfile {
            channel_id: id.to_string(),
            title: id.to_string(),
            description: None,
            published_at: None,
            channel_url: trendscope_core::snapshot::channel_url(id),
            thumbnail: None,
            subscribers: 1,
            views: 1,
            videos: 1,
        }
    }

    #[test]
    fn append_new_skips_listed_and_repeated_channels() {
        let mut listed = vec![profile("a")];
        let added = append_new(&mut listed, vec![profile("a"), profile("b"), profile("b")]);
        assert_eq!(added, 1);
        let ids: Vec<&str> = listed.iter().map(|p| p.channel_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }
}
