//! YouTube Data API v3 response types.
//!
//! Only the fields the collector reads are modelled. List responses keep their
//! items as raw JSON so one malformed item can be dropped without failing the
//! page; see [`crate::normalize`].

use serde::{Deserialize, Deserializer};

/// Envelope shared by `videos.list` and `channels.list`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResponse {
    #[serde(default)]
    pub items: Vec<serde_json::Value>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

// ---------------------------------------------------------------------------
// videos.list
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct VideoItem {
    pub id: String,
    pub snippet: VideoSnippet,
    #[serde(default)]
    pub statistics: VideoStatistics,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoSnippet {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub channel_id: String,
    #[serde(default)]
    pub channel_title: String,
    #[serde(default)]
    pub category_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoStatistics {
    #[serde(default, deserialize_with = "count")]
    pub view_count: u64,
}

// ---------------------------------------------------------------------------
// channels.list
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct ChannelItem {
    pub id: String,
    #[serde(default)]
    pub snippet: ChannelSnippet,
    #[serde(default)]
    pub statistics: ChannelStatistics,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelSnippet {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    /// RFC 3339 timestamp, e.g. `2012-05-01T10:00:00Z`.
    #[serde(default)]
    pub published_at: Option<String>,
    #[serde(default)]
    pub thumbnails: Thumbnails,
}

#[derive(Debug, Default, Deserialize)]
pub struct Thumbnails {
    #[serde(default)]
    pub high: Option<Thumbnail>,
    #[serde(default)]
    pub medium: Option<Thumbnail>,
    #[serde(default)]
    pub default: Option<Thumbnail>,
}

impl Thumbnails {
    /// Largest available thumbnail URL.
    #[must_use]
    pub fn best_url(&self) -> Option<&str> {
        [&self.high, &self.medium, &self.default]
            .into_iter()
            .flatten()
            .map(|t| t.url.as_str())
            .next()
    }
}

#[derive(Debug, Deserialize)]
pub struct Thumbnail {
    pub url: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelStatistics {
    #[serde(default, deserialize_with = "count")]
    pub subscriber_count: u64,
    #[serde(default, deserialize_with = "count")]
    pub view_count: u64,
    #[serde(default, deserialize_with = "count")]
    pub video_count: u64,
    #[serde(default)]
    pub hidden_subscriber_count: bool,
}

// ---------------------------------------------------------------------------
// errors
// ---------------------------------------------------------------------------

/// Google API error envelope: `{"error": {"code", "message", "errors": [..]}}`.
#[derive(Debug, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub code: u16,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub errors: Vec<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
pub struct ErrorDetail {
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub message: String,
}

impl ErrorBody {
    /// First machine-readable reason, e.g. `quotaExceeded`.
    #[must_use]
    pub fn reason(&self) -> &str {
        self.errors
            .iter()
            .map(|e| e.reason.as_str())
            .find(|r| !r.is_empty())
            .unwrap_or("unknown")
    }
}

/// Statistics arrive as decimal strings (`"12345"`); accept numbers too.
/// Anything unparseable reads as 0.
fn count<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u64),
        Text(String),
        Other(serde_json::Value),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Number(n) => n,
        Raw::Text(s) => s.trim().parse().unwrap_or(0),
        Raw::Other(_) => 0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statistics_accept_strings_and_numbers() {
        let stats: ChannelStatistics = serde_json::from_value(serde_json::json!({
            "subscriberCount": "1200",
            "viewCount": 99,
            "videoCount": "n/a",
            "hiddenSubscriberCount": false
        }))
        .unwrap();
        assert_eq!(stats.subscriber_count, 1200);
        assert_eq!(stats.view_count, 99);
        assert_eq!(stats.video_count, 0);
    }

    #[test]
    fn missing_statistics_default_to_zero() {
        let stats: VideoStatistics = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(stats.view_count, 0);
    }

    #[test]
    fn best_thumbnail_prefers_high() {
        let thumbs: Thumbnails = serde_json::from_value(serde_json::json!({
            "default": {"url": "d"},
            "high": {"url": "h"}
        }))
        .unwrap();
        assert_eq!(thumbs.best_url(), Some("h"));
        assert_eq!(Thumbnails::default().best_url(), None);
    }

    #[test]
    fn error_reason_defaults_to_unknown() {
        let envelope: ErrorEnvelope = serde_json::from_value(serde_json::json!({
            "error": {"code": 400, "message": "bad", "errors": []}
        }))
        .unwrap();
        assert_eq!(envelope.error.reason(), "unknown");
    }
}
