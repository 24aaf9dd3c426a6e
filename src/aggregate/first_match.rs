use crate::aggregate::traits::{Aggregate, AggregateOutput, OldestRecord};
use crate::catalog::CatalogItem;
use chrono::{DateTime, Datelike, Utc};

/// Timestamp plausibility rule applied before an item can win the
/// first-match search
///
/// Some sources carry placeholder dates (year zero, or day-of-month
/// defaulted to 01 when the true day is unknown), so the oldest item by
/// sort key is not necessarily the oldest real one.
#[derive(Debug, Clone, Copy)]
pub struct DateRule {
    /// Years at or below this value are rejected
    pub min_year: i32,

    /// Reject timestamps on the first day of a month
    pub skip_first_of_month: bool,
}

impl DateRule {
    /// Whether a datetime string represents a plausible date under this rule
    pub fn is_valid(&self, datetime: &str) -> bool {
        let Ok(parsed) = DateTime::parse_from_rfc3339(datetime) else {
            return false;
        };

        let year = parsed.year();
        if year <= self.min_year || year > Utc::now().year() + 1 {
            return false;
        }

        if self.skip_first_of_month && parsed.day() == 1 {
            return false;
        }

        true
    }
}

/// Returns the first item, in arrival order, whose timestamp passes the
/// validity rule
///
/// The catalog is asked to deliver items sorted ascending by datetime,
/// so the first valid item is the oldest valid one. Saturates as soon as
/// a match is found; the walker then stops paginating the collection.
pub struct FirstMatch {
    rule: DateRule,
    found: Option<OldestRecord>,
}

impl FirstMatch {
    pub fn new(rule: DateRule) -> Self {
        Self { rule, found: None }
    }
}

impl Aggregate for FirstMatch {
    fn absorb(&mut self, item: CatalogItem) {
        if self.found.is_some() {
            return;
        }

        let Some(datetime) = item.property_str("datetime") else {
            return;
        };

        if !self.rule.is_valid(datetime) {
            tracing::debug!(
                "Skipping item {} with implausible date: {}",
                item.id().unwrap_or("<no id>"),
                datetime
            );
            return;
        }

        self.found = Some(OldestRecord {
            item_id: item.id().unwrap_or_default().to_string(),
            datetime: datetime.to_string(),
            title: item.property_str("title").unwrap_or_default().to_string(),
            description: item
                .property_str("description")
                .unwrap_or_default()
                .to_string(),
        });
    }

    fn saturated(&self) -> bool {
        self.found.is_some()
    }

    fn finish(self: Box<Self>) -> AggregateOutput {
        AggregateOutput::Oldest(self.found)
    }
}
