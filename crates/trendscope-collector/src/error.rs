use thiserror::Error;
use trendscope_core::RollupError;
use trendscope_store::StoreError;

#[derive(Debug, Error)]
pub enum CollectError {
    #[error("no regions to collect")]
    NoRegions,

    #[error("all {failed} regions failed")]
    AllRegionsFailed { failed: usize },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Rollup(#[from] RollupError),
}
