use crate::catalog::CatalogItem;
use std::collections::HashMap;

/// Per-collection aggregation strategy
///
/// A walker owns exactly one aggregator for the lifetime of its
/// collection's harvest and feeds it every decoded item in server order.
/// Implementations must never fail on malformed items; an item missing
/// the fields a strategy cares about contributes nothing.
pub trait Aggregate: Send {
    /// Folds one item into the accumulator
    fn absorb(&mut self, item: CatalogItem);

    /// Whether the strategy has everything it needs
    ///
    /// Once this returns true the walker stops requesting further pages
    /// for the collection.
    fn saturated(&self) -> bool {
        false
    }

    /// Consumes the accumulator, yielding its terminal state
    fn finish(self: Box<Self>) -> AggregateOutput;
}

/// Terminal accumulator state, merged into the run results by the
/// scheduler after the owning walker finishes
#[derive(Debug, Clone, PartialEq)]
pub enum AggregateOutput {
    /// Category key to occurrence count
    Counts(HashMap<String, u64>),

    /// The first item that passed the validity rule, if any
    Oldest(Option<OldestRecord>),

    /// Retained raw records
    Samples(Vec<serde_json::Value>),

    /// A worker that produced nothing (contained panic)
    Empty,
}

/// The fields of interest of a first-match result
#[derive(Debug, Clone, PartialEq)]
pub struct OldestRecord {
    pub item_id: String,
    pub datetime: String,
    pub title: String,
    pub description: String,
}
