use chrono::{NaiveDate, NaiveDateTime, Timelike};
use trendscope_core::{AppConfig, RegionsFile, RetentionPolicy, TrendWindow};

/// Everything one collection cycle needs besides the source and the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CyclePlan {
    pub regions: Vec<String>,
    pub categories: Vec<String>,
    /// Calendar date stamped on every snapshot of the cycle.
    pub date: NaiveDate,
    pub window: TrendWindow,
    pub max_concurrent_regions: usize,
    pub retention: RetentionPolicy,
    /// Fetch and normalize, but write nothing.
    pub dry_run: bool,
}

impl CyclePlan {
    /// Plan a cycle over every configured region, stamped with local time `now`.
    #[must_use]
    pub fn new(regions: &RegionsFile, config: &AppConfig, now: NaiveDateTime) -> Self {
        Self {
            regions: regions.regions.clone(),
            categories: regions.categories.clone(),
            date: now.date(),
            window: TrendWindow::from_hour(now.hour()),
            max_concurrent_regions: config.max_concurrent_regions.max(1),
            retention: config.retention,
            dry_run: false,
        }
    }

    /// Restrict the plan to `only` (case-insensitive). An empty filter keeps
    /// every region.
    #[must_use]
    pub fn with_regions(mut self, only: &[String]) -> Self {
        if !only.is_empty() {
            self.regions.retain(|r| only.iter().any(|o| o.eq_ignore_ascii_case(r)));
        }
        self
    }

    #[must_use]
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}
