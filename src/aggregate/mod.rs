//! Aggregation strategies
//!
//! A walker folds every harvested item into exactly one [`Aggregate`]
//! implementation, chosen by the run's harvest mode:
//! - [`FrequencyCounter`] tallies a category property across all items
//! - [`FirstMatch`] finds the oldest item with a plausible timestamp
//! - [`SampleCollector`] keeps the first few raw records

mod first_match;
mod frequency;
mod sample;
mod traits;

pub use first_match::{DateRule, FirstMatch};
pub use frequency::FrequencyCounter;
pub use sample::SampleCollector;
pub use traits::{Aggregate, AggregateOutput, OldestRecord};

use crate::config::{CollectionEntry, HarvestConfig, HarvestMode};

/// Builds the aggregator for one collection according to the harvest mode
pub fn aggregator_for(harvest: &HarvestConfig, entry: &CollectionEntry) -> Box<dyn Aggregate> {
    match harvest.mode {
        HarvestMode::CountryCounts => Box::new(FrequencyCounter::new(&harvest.count_property)),
        HarvestMode::OldestItem => Box::new(FirstMatch::new(DateRule {
            min_year: entry.min_year,
            skip_first_of_month: entry.skip_first_of_month,
        })),
        HarvestMode::FirstRecords => Box::new(SampleCollector::new(
            harvest.sample_role.as_deref(),
            harvest.max_samples as usize,
        )),
    }
}
