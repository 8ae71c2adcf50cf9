//! Per-channel history rollup.
//!
//! A [`ChannelHistory`] holds three series that only ever grow at the end:
//! one [`DailyPoint`] per calendar date, one [`MonthBucket`] per `YYYY-MM`,
//! and one [`QuarterBucket`] per `YYYY-Qn`. Applying a snapshot either opens a
//! new bucket (`start = end`, zero growth) or moves the open bucket's `end`
//! and recomputes growth from `start`, so re-applying the same snapshot is a
//! no-op.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::snapshot::ChannelSnapshot;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RollupError {
    #[error("snapshot for channel {snapshot} applied to history of {history}")]
    ChannelMismatch { history: String, snapshot: String },

    #[error("snapshot dated {date} for channel {channel_id} is older than recorded period {latest}")]
    OutOfOrder {
        channel_id: String,
        date: NaiveDate,
        latest: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyPoint {
    pub date: NaiveDate,
    pub subscribers: u64,
    pub views_total: u64,
    pub videos_total: u64,
}

/// Start/end/growth aggregate shared by month and quarter buckets.
///
/// Growth fields are always `end - start`; they are never written on their own.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodStats {
    pub subscribers_start: u64,
    pub subscribers_end: u64,
    pub subscribers_growth: i64,
    pub views_start: u64,
    pub views_total: u64,
    pub views_growth: i64,
    pub videos_start: u64,
    pub videos_total: u64,
    pub videos_added: i64,
}

impl PeriodStats {
    fn opened(snapshot: &ChannelSnapshot) -> Self {
        Self {
            subscribers_start: snapshot.subscribers,
            subscribers_end: snapshot.subscribers,
            subscribers_growth: 0,
            views_start: snapshot.views_total,
            views_total: snapshot.views_total,
            views_growth: 0,
            videos_start: snapshot.videos_total,
            videos_total: snapshot.videos_total,
            videos_added: 0,
        }
    }

    fn advance(&mut self, snapshot: &ChannelSnapshot) {
        self.subscribers_end = snapshot.subscribers;
        self.subscribers_growth = signed_delta(self.subscribers_start, self.subscribers_end);
        self.views_total = snapshot.views_total;
        self.views_growth = signed_delta(self.views_start, self.views_total);
        self.videos_total = snapshot.videos_total;
        self.videos_added = signed_delta(self.videos_start, self.videos_total);
    }
}

fn signed_delta(start: u64, end: u64) -> i64 {
    let delta = i128::from(end) - i128::from(start);
    i64::try_from(delta).unwrap_or(if delta > 0 { i64::MAX } else { i64::MIN })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthBucket {
    /// `YYYY-MM`
    pub month: String,
    #[serde(flatten)]
    pub stats: PeriodStats,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuarterBucket {
    /// `YYYY-Qn`
    pub quarter: String,
    #[serde(flatten)]
    pub stats: PeriodStats,
}

trait PeriodBucket {
    fn open(key: String, stats: PeriodStats) -> Self;
    fn key(&self) -> &str;
    fn stats_mut(&mut self) -> &mut PeriodStats;
}

impl PeriodBucket for MonthBucket {
    fn open(month: String, stats: PeriodStats) -> Self {
        Self { month, stats }
    }

    fn key(&self) -> &str {
        &self.month
    }

    fn stats_mut(&mut self) -> &mut PeriodStats {
        &mut self.stats
    }
}

impl PeriodBucket for QuarterBucket {
    fn open(quarter: String, stats: PeriodStats) -> Self {
        Self { quarter, stats }
    }

    fn key(&self) -> &str {
        &self.quarter
    }

    fn stats_mut(&mut self) -> &mut PeriodStats {
        &mut self.stats
    }
}

/// Open a bucket for `key` or advance the open one. Returns `true` when a
/// bucket was opened.
fn roll<B: PeriodBucket>(buckets: &mut Vec<B>, key: String, snapshot: &ChannelSnapshot) -> bool {
    match buckets.last_mut() {
        Some(open) if open.key() == key => {
            open.stats_mut().advance(snapshot);
            false
        }
        _ => {
            buckets.push(B::open(key, PeriodStats::opened(snapshot)));
            true
        }
    }
}

/// `(YYYY-MM, YYYY-Qn)` for a date; quarter is `(month - 1) / 3 + 1`.
#[must_use]
pub fn period_keys(date: NaiveDate) -> (String, String) {
    let month = date.format("%Y-%m").to_string();
    let quarter = format!("{}-Q{}", date.year(), (date.month() - 1) / 3 + 1);
    (month, quarter)
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistorySeries {
    #[serde(default)]
    pub daily: Vec<DailyPoint>,
    #[serde(default)]
    pub monthly: Vec<MonthBucket>,
    #[serde(default)]
    pub quarterly: Vec<QuarterBucket>,
}

/// Long-running history of one channel, shared by every region it trends in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelHistory {
    pub channel_id: String,
    pub channel_title: String,
    #[serde(default)]
    pub history: HistorySeries,
}

/// What one [`ChannelHistory::apply`] call changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RollupOutcome {
    pub daily_appended: bool,
    pub month_opened: bool,
    pub quarter_opened: bool,
}

impl ChannelHistory {
    #[must_use]
    pub fn new(channel_id: impl Into<String>, channel_title: impl Into<String>) -> Self {
        Self {
            channel_id: channel_id.into(),
            channel_title: channel_title.into(),
            history: HistorySeries::default(),
        }
    }

    /// Empty history keyed by the snapshot's channel.
    #[must_use]
    pub fn for_snapshot(snapshot: &ChannelSnapshot) -> Self {
        Self::new(&snapshot.channel_id, &snapshot.channel_title)
    }

    /// Roll one snapshot into the daily, monthly, and quarterly series.
    ///
    /// The first snapshot of a date wins the daily series. Month and quarter
    /// buckets always reflect the latest sample in the period.
    ///
    /// # Errors
    ///
    /// - [`RollupError::ChannelMismatch`] if the snapshot is for another channel.
    /// - [`RollupError::OutOfOrder`] if the snapshot predates the newest
    ///   recorded day, month, or quarter. The history is left untouched.
    pub fn apply(&mut self, snapshot: &ChannelSnapshot) -> Result<RollupOutcome, RollupError> {
        if snapshot.channel_id != self.channel_id {
            return Err(RollupError::ChannelMismatch {
                history: self.channel_id.clone(),
                snapshot: snapshot.channel_id.clone(),
            });
        }

        let date = snapshot.last_seen;
        let (month_key, quarter_key) = period_keys(date);
        self.check_order(date, &month_key, &quarter_key)?;

        if !snapshot.channel_title.is_empty() {
            self.channel_title.clone_from(&snapshot.channel_title);
        }

        let series = &mut self.history;
        let daily_appended = series.daily.last().is_none_or(|last| last.date != date);
        if daily_appended {
            series.daily.push(DailyPoint {
                date,
                subscribers: snapshot.subscribers,
                views_total: snapshot.views_total,
                videos_total: snapshot.videos_total,
            });
        }

        let month_opened = roll(&mut series.monthly, month_key, snapshot);
        let quarter_opened = roll(&mut series.quarterly, quarter_key, snapshot);

        Ok(RollupOutcome {
            daily_appended,
            month_opened,
            quarter_opened,
        })
    }

    fn check_order(&self, date: NaiveDate, month: &str, quarter: &str) -> Result<(), RollupError> {
        let out_of_order = |latest: String| RollupError::OutOfOrder {
            channel_id: self.channel_id.clone(),
            date,
            latest,
        };

        let series = &self.history;
        if let Some(last) = series.daily.last().filter(|p| p.date > date) {
            return Err(out_of_order(last.date.to_string()));
        }
        if let Some(last) = series.monthly.last().filter(|b| b.month.as_str() > month) {
            return Err(out_of_order(last.month.clone()));
        }
        if let Some(last) = series
            .quarterly
            .last()
            .filter(|b| b.quarter.as_str() > quarter)
        {
            return Err(out_of_order(last.quarter.clone()));
        }
        Ok(())
    }

    /// Percent change between the last two daily points.
    ///
    /// `None` until at least two days have been recorded.
    #[must_use]
    pub fn latest_growth(&self) -> Option<GrowthReport> {
        let [.., prev, curr] = self.history.daily.as_slice() else {
            return None;
        };
        Some(GrowthReport {
            date_prev: prev.date,
            date_curr: curr.date,
            subscribers: MetricGrowth::between(prev.subscribers, curr.subscribers),
            views_total: MetricGrowth::between(prev.views_total, curr.views_total),
            videos_total: MetricGrowth::between(prev.videos_total, curr.videos_total),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GrowthReport {
    pub date_prev: NaiveDate,
    pub date_curr: NaiveDate,
    pub subscribers: MetricGrowth,
    pub views_total: MetricGrowth,
    pub videos_total: MetricGrowth,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricGrowth {
    pub previous: u64,
    pub current: u64,
    /// Rounded to two decimals; 0 when `previous` is 0.
    pub growth_percent: f64,
}

impl MetricGrowth {
    #[allow(clippy::cast_precision_loss)]
    fn between(previous: u64, current: u64) -> Self {
        let growth_percent = if previous == 0 {
            0.0
        } else {
            let raw = (current as f64 - previous as f64) / previous as f64 * 100.0;
            (raw * 100.0).round() / 100.0
        };
        Self {
            previous,
            current,
            growth_percent,
        }
    }
}

/// Optional caps on how many entries each series keeps.
///
/// `None` keeps everything. The open (newest) entry is never trimmed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RetentionPolicy {
    pub max_daily: Option<usize>,
    pub max_monthly: Option<usize>,
    pub max_quarterly: Option<usize>,
}

impl RetentionPolicy {
    #[must_use]
    pub fn is_unbounded(&self) -> bool {
        self.max_daily.is_none() && self.max_monthly.is_none() && self.max_quarterly.is_none()
    }

    /// Drop the oldest entries beyond each cap. Returns how many were removed.
    pub fn enforce(&self, history: &mut ChannelHistory) -> usize {
        let series = &mut history.history;
        trim_front(&mut series.daily, self.max_daily)
            + trim_front(&mut series.monthly, self.max_monthly)
            + trim_front(&mut series.quarterly, self.max_quarterly)
    }
}

fn trim_front<T>(entries: &mut Vec<T>, cap: Option<usize>) -> usize {
    let Some(cap) = cap else {
        return 0;
    };
    let excess = entries.len().saturating_sub(cap.max(1));
    entries.drain(..excess);
    excess
}

#[cfg(test)]
#[path = "rollup_test.rs"]
mod tests;
