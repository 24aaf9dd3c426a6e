use crate::aggregate::traits::{Aggregate, AggregateOutput};
use crate::catalog::CatalogItem;

/// Retains the first few raw records of a collection
///
/// Optionally only items carrying a given role are eligible, matching
/// the catalog's habit of mixing event, hazard, and source records in
/// one collection. Saturates once the bound is reached.
pub struct SampleCollector {
    role: Option<String>,
    max_samples: usize,
    records: Vec<serde_json::Value>,
}

impl SampleCollector {
    pub fn new(role: Option<&str>, max_samples: usize) -> Self {
        Self {
            role: role.map(str::to_string),
            max_samples,
            records: Vec::new(),
        }
    }
}

impl Aggregate for SampleCollector {
    fn absorb(&mut self, item: CatalogItem) {
        if self.records.len() >= self.max_samples {
            return;
        }

        if let Some(role) = &self.role {
            if !item.has_role(role) {
                return;
            }
        }

        self.records.push(item.into_value());
    }

    fn saturated(&self) -> bool {
        self.records.len() >= self.max_samples
    }

    fn finish(self: Box<Self>) -> AggregateOutput {
        AggregateOutput::Samples(self.records)
    }
}
