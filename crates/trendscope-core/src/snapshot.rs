//! Records exchanged between the platform client, the aggregation engine,
//! and the persisted documents.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

const CHANNEL_URL_PREFIX: &str = "https://www.youtube.com/channel/";

/// One item of a region/category trending list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawVideo {
    pub video_id: String,
    pub title: String,
    /// Tags exactly as the platform returned them (not yet normalized).
    pub tags: Vec<String>,
    pub channel_id: String,
    pub channel_title: String,
    pub view_count: u64,
    pub category_id: String,
    pub region: String,
}

/// Channel statistics and profile fields from a metadata lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelMetadata {
    pub channel_id: String,
    pub title: String,
    pub description: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub thumbnail_url: Option<String>,
    /// Zero when the channel hides its subscriber count.
    pub subscriber_count: u64,
    pub view_count: u64,
    pub video_count: u64,
}

/// A channel's trending footprint within one region/cycle, before enrichment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrendingChannel {
    pub channel_id: String,
    pub channel_title: String,
    /// Distinct trending videos by this channel in the cycle.
    pub count: u32,
    pub last_seen: NaiveDate,
}

/// One channel's observed state at a point in time.
///
/// Created fresh each cycle and never mutated afterwards; the mergers and the
/// rollup engine only ever read it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelSnapshot {
    pub channel_id: String,
    pub channel_title: String,
    #[serde(default)]
    pub count: u32,
    pub subscribers: u64,
    pub views_total: u64,
    pub videos_total: u64,
    pub last_seen: NaiveDate,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub custom_url: Option<String>,
}

impl ChannelSnapshot {
    /// Combine a trending footprint with the channel's metadata.
    #[must_use]
    pub fn from_parts(channel: &TrendingChannel, metadata: &ChannelMetadata) -> Self {
        let channel_title = if metadata.title.is_empty() {
            channel.channel_title.clone()
        } else {
            metadata.title.clone()
        };

        Self {
            channel_id: channel.channel_id.clone(),
            channel_title,
            count: channel.count,
            subscribers: metadata.subscriber_count,
            views_total: metadata.view_count,
            videos_total: metadata.video_count,
            last_seen: channel.last_seen,
            created_at: metadata.published_at,
            custom_url: Some(channel_url(&channel.channel_id)),
        }
    }
}

/// A channel directory entry served by the query layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelProfile {
    pub channel_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    pub channel_url: String,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub subscribers: u64,
    #[serde(default)]
    pub views: u64,
    #[serde(default)]
    pub videos: u64,
}

impl From<ChannelMetadata> for ChannelProfile {
    fn from(metadata: ChannelMetadata) -> Self {
        Self {
            channel_url: channel_url(&metadata.channel_id),
            channel_id: metadata.channel_id,
            title: metadata.title,
            description: metadata.description,
            published_at: metadata.published_at,
            thumbnail: metadata.thumbnail_url,
            subscribers: metadata.subscriber_count,
            views: metadata.view_count,
            videos: metadata.video_count,
        }
    }
}

/// Public channel page for a channel id.
#[must_use]
pub fn channel_url(channel_id: &str) -> String {
    format!("{CHANNEL_URL_PREFIX}{channel_id}")
}

/// Time-of-day window a collection cycle ran in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendWindow {
    Night,
    Morning,
    Day,
    Evening,
}

impl TrendWindow {
    /// Classify a local hour (0–23). Hours past 23 count as evening.
    #[must_use]
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            0..=7 => TrendWindow::Night,
            8..=13 => TrendWindow::Morning,
            14..=19 => TrendWindow::Day,
            _ => TrendWindow::Evening,
        }
    }
}

impl std::fmt::Display for TrendWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrendWindow::Night => write!(f, "night"),
            TrendWindow::Morning => write!(f, "morning"),
            TrendWindow::Day => write!(f, "day"),
            TrendWindow::Evening => write!(f, "evening"),
        }
    }
}
