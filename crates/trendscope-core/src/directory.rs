//! Cross-region channel directory.
//!
//! Region sets are updated independently, so the same channel can appear in
//! several of them with different values. The merged view keeps the record
//! from the first region scanned; this is the opposite of the trending-set
//! merge, where the latest cycle wins.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};

use crate::snapshot::{ChannelProfile, ChannelSnapshot};
use crate::trending::RegionTrendingSet;

/// A record that belongs to exactly one channel.
pub trait ChannelKeyed {
    fn channel_id(&self) -> &str;
}

impl ChannelKeyed for ChannelSnapshot {
    fn channel_id(&self) -> &str {
        &self.channel_id
    }
}

impl ChannelKeyed for ChannelProfile {
    fn channel_id(&self) -> &str {
        &self.channel_id
    }
}

/// Flatten per-region record lists into one list with unique channel ids.
///
/// The first record seen for an id wins; later ones are dropped. Records with
/// an empty id are skipped. Output keeps scan order.
pub fn dedup_first_seen<T, S, I>(sets: I) -> Vec<T>
where
    T: ChannelKeyed,
    S: IntoIterator<Item = T>,
    I: IntoIterator<Item = S>,
{
    let mut seen: HashSet<String> = HashSet::new();
    let mut merged = Vec::new();
    for set in sets {
        for record in set {
            let id = record.channel_id();
            if id.is_empty() || seen.contains(id) {
                continue;
            }
            seen.insert(id.to_string());
            merged.push(record);
        }
    }
    merged
}

/// Ids in `trending` that have no profile in `existing` yet, ordered by id.
#[must_use]
pub fn directory_additions(trending: &RegionTrendingSet, existing: &[ChannelProfile]) -> Vec<String> {
    let known: HashSet<&str> = existing.iter().map(|p| p.channel_id.as_str()).collect();
    trending
        .channel_ids()
        .filter(|id| !known.contains(id))
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortKey {
    #[default]
    Subscribers,
    Views,
}

impl SortKey {
    /// Query-string form: anything other than `views` sorts by subscribers.
    #[must_use]
    pub fn from_param(raw: Option<&str>) -> Self {
        match raw {
            Some("views") => SortKey::Views,
            _ => SortKey::Subscribers,
        }
    }

    fn value(self, profile: &ChannelProfile) -> u64 {
        match self {
            SortKey::Subscribers => profile.subscribers,
            SortKey::Views => profile.views,
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortKey::Subscribers => write!(f, "subscribers"),
            SortKey::Views => write!(f, "views"),
        }
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "subscribers" => Ok(SortKey::Subscribers),
            "views" => Ok(SortKey::Views),
            other => Err(format!("unknown sort key '{other}' (expected subscribers|views)")),
        }
    }
}

/// How recently a channel must have been created to pass the filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreatedWindow {
    Week,
    Month,
    NinetyDays,
}

impl CreatedWindow {
    /// Query-string form: unknown values mean no filter.
    #[must_use]
    pub fn from_param(raw: Option<&str>) -> Option<Self> {
        raw.and_then(|s| s.parse().ok())
    }

    #[must_use]
    pub fn days(self) -> i64 {
        match self {
            CreatedWindow::Week => 7,
            CreatedWindow::Month => 30,
            CreatedWindow::NinetyDays => 90,
        }
    }
}

impl fmt::Display for CreatedWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CreatedWindow::Week => write!(f, "week"),
            CreatedWindow::Month => write!(f, "month"),
            CreatedWindow::NinetyDays => write!(f, "90days"),
        }
    }
}

impl FromStr for CreatedWindow {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "week" => Ok(CreatedWindow::Week),
            "month" => Ok(CreatedWindow::Month),
            "90days" => Ok(CreatedWindow::NinetyDays),
            other => Err(format!(
                "unknown created window '{other}' (expected week|month|90days)"
            )),
        }
    }
}

/// Read-side filter and ordering over a merged directory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DirectoryQuery {
    pub sort: SortKey,
    pub created_within: Option<CreatedWindow>,
}

impl DirectoryQuery {
    /// Filter by creation window relative to `now`, then sort descending by
    /// the sort key. Ties keep their input order.
    ///
    /// With a window set, profiles without `published_at` are dropped.
    #[must_use]
    pub fn apply(&self, mut profiles: Vec<ChannelProfile>, now: DateTime<Utc>) -> Vec<ChannelProfile> {
        if let Some(window) = self.created_within {
            let cutoff = now - Duration::days(window.days());
            profiles.retain(|p| p.published_at.is_some_and(|created| created >= cutoff));
        }
        let sort = self.sort;
        profiles.sort_by(|a, b| sort.value(b).cmp(&sort.value(a)));
        profiles
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeZone};

    use super::*;

    fn profile(id: &str, subscribers: u64, views: u64, created_days_ago: Option<i64>) -> ChannelProfile {
        ChannelProfile {
            channel_id: id.to_string(),
            title: format!("title {id}"),
            description: None,
            published_at: created_days_ago.map(|d| now() - Duration::days(d)),
            channel_url: format!("https://www.youtube.com/channel/{id}"),
            thumbnail: None,
            subscribers,
            views,
            videos: 0,
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn snap(id: &str, subscribers: u64) -> ChannelSnapshot {
        ChannelSnapshot {
            channel_id: id.to_string(),
            channel_title: id.to_string(),
            count: 1,
            subscribers,
            views_total: 0,
            videos_total: 0,
            last_seen: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            created_at: None,
            custom_url: None,
        }
    }

    #[test]
    fn first_region_wins_for_shared_channel() {
        let region_a = vec![snap("id1", 100), snap("id2", 200)];
        let region_b = vec![snap("id1", 999), snap("id3", 300)];

        let merged = dedup_first_seen(vec![region_a, region_b]);

        let ids: Vec<&str> = merged.iter().map(|s| s.channel_id.as_str()).collect();
        assert_eq!(ids, vec!["id1", "id2", "id3"]);
        assert_eq!(merged[0].subscribers, 100);
    }

    #[test]
    fn dedup_works_over_trending_sets() {
        let a: RegionTrendingSet = vec![snap("x", 1)].into_iter().collect();
        let b: RegionTrendingSet = vec![snap("x", 2), snap("y", 3)].into_iter().collect();

        let merged = dedup_first_seen([a, b].map(RegionTrendingSet::into_snapshots));
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].subscribers, 1);
    }

    #[test]
    fn dedup_skips_empty_ids() {
        let merged = dedup_first_seen(vec![vec![profile("", 1, 1, None), profile("a", 2, 2, None)]]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].channel_id, "a");
    }

    #[test]
    fn additions_are_trending_ids_missing_from_directory() {
        let trending: RegionTrendingSet = vec![snap("c", 1), snap("a", 1), snap("b", 1)]
            .into_iter()
            .collect();
        let existing = vec![profile("b", 0, 0, None)];
        assert_eq!(directory_additions(&trending, &existing), vec!["a", "c"]);
    }

    #[test]
    fn query_sorts_descending_by_key() {
        let profiles = vec![
            profile("a", 10, 500, None),
            profile("b", 30, 100, None),
            profile("c", 20, 900, None),
        ];

        let by_subs = DirectoryQuery::default().apply(profiles.clone(), now());
        let ids: Vec<&str> = by_subs.iter().map(|p| p.channel_id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c", "a"]);

        let by_views = DirectoryQuery {
            sort: SortKey::Views,
            created_within: None,
        }
        .apply(profiles, now());
        let ids: Vec<&str> = by_views.iter().map(|p| p.channel_id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    #[test]
    fn created_window_filters_old_and_undated_channels() {
        let profiles = vec![
            profile("new", 1, 1, Some(3)),
            profile("edge", 1, 1, Some(7)),
            profile("old", 1, 1, Some(40)),
            profile("undated", 1, 1, None),
        ];
        let query = DirectoryQuery {
            sort: SortKey::Subscribers,
            created_within: Some(CreatedWindow::Week),
        };
        let kept: Vec<String> = query
            .apply(profiles, now())
            .into_iter()
            .map(|p| p.channel_id)
            .collect();
        assert_eq!(kept, vec!["new", "edge"]);
    }

    #[test]
    fn params_are_lenient() {
        assert_eq!(SortKey::from_param(Some("views")), SortKey::Views);
        assert_eq!(SortKey::from_param(Some("likes")), SortKey::Subscribers);
        assert_eq!(SortKey::from_param(None), SortKey::Subscribers);
        assert_eq!(CreatedWindow::from_param(Some("90days")), Some(CreatedWindow::NinetyDays));
        assert_eq!(CreatedWindow::from_param(Some("year")), None);
        assert!("year".parse::<CreatedWindow>().is_err());
    }
}
