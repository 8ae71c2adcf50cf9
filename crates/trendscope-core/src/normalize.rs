//! Turns one region/cycle's raw trending videos into hashtag percentages and
//! per-channel trending footprints, and joins those footprints with channel
//! metadata into [`ChannelSnapshot`]s.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::NaiveDate;

use crate::snapshot::{ChannelMetadata, ChannelSnapshot, RawVideo, TrendingChannel};

/// Upper bound on ids per channel-metadata request imposed by the platform.
pub const METADATA_BATCH_SIZE: usize = 50;

/// Normalized result of one region/cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleDigest {
    /// `normalized_tag → percentage of the cycle's videos carrying it`.
    pub hashtags: BTreeMap<String, f64>,
    /// Channels ordered by trending count, descending.
    pub channels: Vec<TrendingChannel>,
    /// Distinct videos the percentages were computed over.
    pub total_videos: usize,
    /// Repeated `video_id`s (e.g. one video listed under two categories).
    pub duplicate_videos: usize,
}

/// Normalize a tag for counting: trimmed and lowercased.
///
/// Returns `None` for blank tags.
#[must_use]
pub fn normalize_tag(tag: &str) -> Option<String> {
    let trimmed = tag.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_lowercase())
    }
}

/// Normalize one region/cycle's videos.
///
/// Videos are deduplicated by `video_id` (first occurrence wins). Each tag
/// counts once per video. Percentages are `count / total * 100` rounded to
/// two decimals, with the total clamped to at least 1.
#[must_use]
pub fn normalize_cycle(videos: &[RawVideo], date: NaiveDate) -> CycleDigest {
    let mut seen_videos = HashSet::new();
    let distinct: Vec<&RawVideo> = videos
        .iter()
        .filter(|v| seen_videos.insert(v.video_id.as_str()))
        .collect();
    let duplicate_videos = videos.len() - distinct.len();

    let mut tag_counts: BTreeMap<String, u32> = BTreeMap::new();
    for video in &distinct {
        let unique_tags: HashSet<String> =
            video.tags.iter().filter_map(|t| normalize_tag(t)).collect();
        for tag in unique_tags {
            *tag_counts.entry(tag).or_insert(0) += 1;
        }
    }

    let total_videos = distinct.len();
    let denominator = total_videos.max(1);
    let hashtags = tag_counts
        .into_iter()
        .map(|(tag, count)| (tag, percentage(count, denominator)))
        .collect();

    CycleDigest {
        hashtags,
        channels: tally_channels(&distinct, date),
        total_videos,
        duplicate_videos,
    }
}

fn tally_channels(videos: &[&RawVideo], date: NaiveDate) -> Vec<TrendingChannel> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut channels: Vec<TrendingChannel> = Vec::new();

    for video in videos {
        if let Some(&i) = index.get(video.channel_id.as_str()) {
            channels[i].count += 1;
        } else {
            index.insert(video.channel_id.as_str(), channels.len());
            channels.push(TrendingChannel {
                channel_id: video.channel_id.clone(),
                channel_title: video.channel_title.clone(),
                count: 1,
                last_seen: date,
            });
        }
    }

    // Stable: equal counts keep first-appearance order.
    channels.sort_by(|a, b| b.count.cmp(&a.count));
    channels
}

#[allow(clippy::cast_precision_loss)]
fn percentage(count: u32, total: usize) -> f64 {
    let raw = f64::from(count) / total as f64 * 100.0;
    (raw * 100.0).round() / 100.0
}

/// Split channel ids into metadata request batches of at most
/// [`METADATA_BATCH_SIZE`].
pub fn metadata_batches(ids: &[String]) -> std::slice::Chunks<'_, String> {
    ids.chunks(METADATA_BATCH_SIZE)
}

/// Join trending channels with their metadata.
///
/// Channels without a metadata record are dropped; their statistics are
/// unknown and cannot be rolled into a history. Output keeps the order of
/// `channels`.
#[must_use]
pub fn enrich(channels: &[TrendingChannel], metadata: &[ChannelMetadata]) -> Vec<ChannelSnapshot> {
    let by_id: HashMap<&str, &ChannelMetadata> = metadata
        .iter()
        .map(|m| (m.channel_id.as_str(), m))
        .collect();

    channels
        .iter()
        .filter_map(|channel| {
            by_id
                .get(channel.channel_id.as_str())
                .map(|meta| ChannelSnapshot::from_parts(channel, meta))
        })
        .collect()
}
