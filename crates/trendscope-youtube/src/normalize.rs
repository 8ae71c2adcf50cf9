//! Conversion of API list items into domain records.
//!
//! Items missing an id or snippet are dropped and counted; one bad item never
//! fails the page it came in.

use chrono::{DateTime, Utc};
use trendscope_core::{ChannelMetadata, RawVideo};

use crate::types::{ChannelItem, VideoItem};

/// Records converted from one page, plus how many items were dropped.
#[derive(Debug, Default)]
pub struct Parsed<T> {
    pub records: Vec<T>,
    pub dropped: usize,
}

/// Converts raw `videos.list` items for one region/category.
#[must_use]
pub fn parse_videos(items: Vec<serde_json::Value>, region: &str, category: &str) -> Parsed<RawVideo> {
    parse_items(items, |item: VideoItem| video_from_item(item, region, category))
}

/// Converts raw `channels.list` items.
#[must_use]
pub fn parse_channels(items: Vec<serde_json::Value>) -> Parsed<ChannelMetadata> {
    parse_items(items, channel_from_item)
}

fn parse_items<I, T, F>(items: Vec<serde_json::Value>, convert: F) -> Parsed<T>
where
    I: serde::de::DeserializeOwned,
    F: Fn(I) -> Option<T>,
{
    let mut parsed = Parsed {
        records: Vec::with_capacity(items.len()),
        dropped: 0,
    };
    for value in items {
        match serde_json::from_value::<I>(value).ok().and_then(&convert) {
            Some(record) => parsed.records.push(record),
            None => parsed.dropped += 1,
        }
    }
    parsed
}

fn video_from_item(item: VideoItem, region: &str, category: &str) -> Option<RawVideo> {
    if item.id.is_empty() || item.snippet.channel_id.is_empty() {
        return None;
    }
    Some(RawVideo {
        video_id: item.id,
        title: item.snippet.title,
        tags: item.snippet.tags,
        channel_id: item.snippet.channel_id,
        channel_title: item.snippet.channel_title,
        view_count: item.statistics.view_count,
        category_id: item
            .snippet
            .category_id
            .unwrap_or_else(|| category.to_string()),
        region: region.to_string(),
    })
}

fn channel_from_item(item: ChannelItem) -> Option<ChannelMetadata> {
    if item.id.is_empty() {
        return None;
    }
    let thumbnail_url = item.snippet.thumbnails.best_url().map(str::to_string);
    let published_at = item.snippet.published_at.as_deref().and_then(parse_timestamp);
    let subscriber_count = if item.statistics.hidden_subscriber_count {
        0
    } else {
        item.statistics.subscriber_count
    };

    Some(ChannelMetadata {
        channel_id: item.id,
        title: item.snippet.title,
        description: item.snippet.description.filter(|d| !d.is_empty()),
        published_at,
        thumbnail_url,
        subscriber_count,
        view_count: item.statistics.view_count,
        video_count: item.statistics.video_count,
    })
}

/// Parses an RFC 3339 timestamp into UTC. Returns `None` if it does not parse.
#[must_use]
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use serde_json::json;

    use super::*;

    #[test]
    fn videos_missing_snippet_are_dropped() {
        let items = vec![
            json!({
                "id": "v1",
                "snippet": {
                    "title": "First",
                    "tags": ["Music", "live"],
                    "channelId": "UC1",
                    "channelTitle": "One",
                    "categoryId": "10"
                },
                "statistics": {"viewCount": "1500"}
            }),
            json!({"id": "v2"}),
            json!({"id": "", "snippet": {"channelId": "UC2"}}),
        ];

        let parsed = parse_videos(items, "US", "10");

        assert_eq!(parsed.dropped, 2);
        assert_eq!(parsed.records.len(), 1);
        let video = &parsed.records[0];
        assert_eq!(video.video_id, "v1");
        assert_eq!(video.tags, vec!["Music", "live"]);
        assert_eq!(video.view_count, 1500);
        assert_eq!(video.region, "US");
        assert_eq!(video.category_id, "10");
    }

    #[test]
    fn video_without_tags_or_statistics_is_kept() {
        let items = vec![json!({"id": "v1", "snippet": {"channelId": "UC1"}})];
        let parsed = parse_videos(items, "GB", "24");
        assert_eq!(parsed.dropped, 0);
        assert!(parsed.records[0].tags.is_empty());
        assert_eq!(parsed.records[0].view_count, 0);
        assert_eq!(parsed.records[0].category_id, "24");
    }

    #[test]
    fn channels_convert_with_hidden_subscribers_as_zero() {
        let items = vec![
            json!({
                "id": "UC1",
                "snippet": {
                    "title": "One",
                    "description": "",
                    "publishedAt": "2012-05-01T10:00:00Z",
                    "thumbnails": {"default": {"url": "https://img/1.jpg"}}
                },
                "statistics": {
                    "subscriberCount": "500",
                    "hiddenSubscriberCount": true,
                    "viewCount": "9000",
                    "videoCount": "12"
                }
            }),
            json!({"snippet": {"title": "no id"}}),
        ];

        let parsed = parse_channels(items);

        assert_eq!(parsed.dropped, 1);
        let meta = &parsed.records[0];
        assert_eq!(meta.subscriber_count, 0);
        assert_eq!(meta.view_count, 9000);
        assert_eq!(meta.video_count, 12);
        assert!(meta.description.is_none());
        assert_eq!(meta.thumbnail_url.as_deref(), Some("https://img/1.jpg"));
        assert_eq!(
            meta.published_at,
            Some(Utc.with_ymd_and_hms(2012, 5, 1, 10, 0, 0).unwrap())
        );
    }

    #[test]
    fn bad_timestamp_reads_as_none() {
        assert!(parse_timestamp("yesterday").is_none());
        assert!(parse_timestamp("2020-01-01T00:00:00.5+02:00").is_some());
    }
}
