//! Pagination walker
//!
//! Drives one collection end-to-end: fetch a page under the retry
//! policy, feed its items to the aggregator, follow the next reference,
//! stop when pagination ends, the aggregator is satisfied, the run is
//! cancelled, or the collection fails for good. A collection that aborts
//! mid-pagination still returns everything accumulated before the abort.

use crate::aggregate::{Aggregate, AggregateOutput};
use crate::catalog::{ItemPage, PageRef};
use crate::harvester::fetcher::fetch_page;
use crate::harvester::retry::RetryPolicy;
use crate::sink::{ErrorSink, FailureRecord};
use reqwest::Client;
use std::sync::atomic::{AtomicBool, Ordering};

/// Walker phases; Done and Aborted are terminal
enum WalkerPhase {
    Fetching(PageRef),
    Accumulating(ItemPage),
    Advancing(Option<PageRef>),
    Done,
    Aborted,
}

/// Terminal outcome of one collection's harvest
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HarvestStatus {
    /// Pagination finished, or the aggregator was satisfied early
    Completed,

    /// Aborted or cancelled after at least one page was accumulated
    Partial,

    /// Aborted before any page was accumulated
    Aborted,
}

/// Per-collection result handed back to the scheduler
#[derive(Debug)]
pub struct CollectionReport {
    pub collection: String,
    pub status: HarvestStatus,
    pub pages_fetched: u32,
    pub items_seen: u64,
    pub output: AggregateOutput,
}

/// Harvests one collection
///
/// Never returns an error: terminal failures are recorded to the sink
/// and folded into the report's status, so one collection's trouble
/// stays its own.
#[allow(clippy::too_many_arguments)]
pub async fn walk_collection(
    client: &Client,
    collection: &str,
    initial: PageRef,
    mut aggregator: Box<dyn Aggregate>,
    policy: &RetryPolicy,
    server_error_fatal: bool,
    sink: &ErrorSink,
    cancelled: &AtomicBool,
) -> CollectionReport {
    tracing::info!("Started processing: {}", collection);

    let mut page_number = 0u32;
    let mut pages_ok = 0u32;
    let mut items_seen = 0u64;

    let mut phase = WalkerPhase::Fetching(initial);

    let status = loop {
        phase = match phase {
            WalkerPhase::Fetching(reference) => {
                if cancelled.load(Ordering::Relaxed) {
                    tracing::info!("Cancelled before page {} of {}", page_number + 1, collection);
                    break partial_or_aborted(pages_ok);
                }

                page_number += 1;

                match policy
                    .run(|| fetch_page(client, &reference, server_error_fatal))
                    .await
                {
                    Ok(page) => WalkerPhase::Accumulating(page),
                    Err(failure) => {
                        let record = FailureRecord::new(
                            collection,
                            page_number,
                            failure.to_string(),
                            Some(reference.as_str().to_string()),
                        );
                        if let Err(e) = sink.append(&record) {
                            tracing::error!("Failed to record failure for {}: {}", collection, e);
                        }
                        tracing::warn!(
                            "Giving up on {} (page {}): {}",
                            collection,
                            page_number,
                            failure
                        );
                        WalkerPhase::Aborted
                    }
                }
            }

            WalkerPhase::Accumulating(page) => {
                let page_items = page.items.len();
                for item in page.items {
                    aggregator.absorb(item);
                }
                items_seen += page_items as u64;
                pages_ok += 1;

                tracing::info!(
                    "{} - page {}: fetched {} items (cumulative: {})",
                    collection,
                    page_number,
                    page_items,
                    items_seen
                );

                if aggregator.saturated() {
                    tracing::info!(
                        "{}: aggregator satisfied on page {}, stopping early",
                        collection,
                        page_number
                    );
                    WalkerPhase::Done
                } else {
                    WalkerPhase::Advancing(page.next)
                }
            }

            WalkerPhase::Advancing(Some(next)) => WalkerPhase::Fetching(next),
            WalkerPhase::Advancing(None) => WalkerPhase::Done,

            WalkerPhase::Done => break HarvestStatus::Completed,
            WalkerPhase::Aborted => break partial_or_aborted(pages_ok),
        };
    };

    tracing::info!(
        "Finished processing: {} ({} pages, {} items, {:?})",
        collection,
        pages_ok,
        items_seen,
        status
    );

    CollectionReport {
        collection: collection.to_string(),
        status,
        pages_fetched: page_number,
        items_seen,
        output: aggregator.finish(),
    }
}

fn partial_or_aborted(pages_ok: u32) -> HarvestStatus {
    if pages_ok > 0 {
        HarvestStatus::Partial
    } else {
        HarvestStatus::Aborted
    }
}
