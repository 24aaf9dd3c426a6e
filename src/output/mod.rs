//! Output module: result files and run summaries
//!
//! The scheduler's merged report map is serialized here into the flat
//! output file matching the harvest mode, and summarized on stdout.

mod csv;
mod summary;

pub use csv::{write_country_counts, write_first_records, write_oldest_items};
pub use summary::print_summary;

use crate::config::HarvestMode;
use crate::harvester::CollectionReport;
use crate::Result;
use std::collections::HashMap;
use std::path::Path;

/// Writes the results file for the given harvest mode
pub fn write_results(
    mode: HarvestMode,
    path: &Path,
    reports: &HashMap<String, CollectionReport>,
) -> Result<()> {
    match mode {
        HarvestMode::CountryCounts => write_country_counts(path, reports),
        HarvestMode::OldestItem => write_oldest_items(path, reports),
        HarvestMode::FirstRecords => write_first_records(path, reports),
    }
}
