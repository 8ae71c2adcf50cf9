//! Collection cycles: fetch trending lists per region, normalize them, and
//! fold the results into the store.
//!
//! [`run_cycle`] is one scheduled collection across all planned regions;
//! [`refresh_directory`] tops up the per-region channel directories. Both
//! talk to the platform only through [`TrendingSource`].

mod cycle;
mod directory;
mod error;
mod plan;
mod source;

pub use cycle::{run_cycle, CycleReport, RegionOutcome, RegionStatus};
pub use directory::{refresh_directory, DirectoryReport, DirectoryRegionOutcome};
pub use error::CollectError;
pub use plan::CyclePlan;
pub use source::TrendingSource;
