//! Worker pool and run orchestration
//!
//! Spawns one pagination walker per collection, every collection started
//! at once, and merges reports in completion order. A failing or
//! panicking collection never blocks or corrupts the others: the run
//! always finishes with exactly one report per requested collection.

use crate::aggregate::{aggregator_for, AggregateOutput};
use crate::catalog::build_initial_query;
use crate::config::Config;
use crate::harvester::fetcher::build_http_client;
use crate::harvester::retry::RetryPolicy;
use crate::harvester::walker::{walk_collection, CollectionReport, HarvestStatus};
use crate::sink::{ErrorSink, FailureRecord};
use crate::Result;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Runs a complete harvest across all configured collections
///
/// Initializes the error sink (truncating any previous run's log)
/// strictly before any worker is scheduled, fans the collections out,
/// and waits for every walker.
///
/// # Arguments
///
/// * `config` - The validated configuration
/// * `cancelled` - Run-level cancellation flag; once set, workers stop
///   before their next page fetch
///
/// # Returns
///
/// * `Ok(map)` - One report per requested collection
/// * `Err(HarvestError)` - Setup failed before any worker started
pub async fn run_harvest(
    config: &Config,
    cancelled: Arc<AtomicBool>,
) -> Result<HashMap<String, CollectionReport>> {
    let sink = Arc::new(ErrorSink::create(Path::new(&config.output.errors_path))?);
    run_harvest_with_sink(config, sink, cancelled).await
}

/// Like [`run_harvest`], but with a caller-supplied sink
pub async fn run_harvest_with_sink(
    config: &Config,
    sink: Arc<ErrorSink>,
    cancelled: Arc<AtomicBool>,
) -> Result<HashMap<String, CollectionReport>> {
    let client = build_http_client(config.retry.request_timeout)?;
    let policy = RetryPolicy::from_config(&config.retry);

    // 0 means one worker per collection, nothing gated
    let limiter = match config.harvest.max_concurrent_collections {
        0 => None,
        bound => Some(Arc::new(Semaphore::new(bound as usize))),
    };

    tracing::info!(
        "Harvesting {} collections ({:?} mode)",
        config.collections.len(),
        config.harvest.mode
    );

    let mut join_set = JoinSet::new();
    let mut spawned: HashMap<tokio::task::Id, String> = HashMap::new();

    for entry in &config.collections {
        let initial = build_initial_query(&config.catalog.base_url, &entry.id, &config.query)?;
        let aggregator = aggregator_for(&config.harvest, entry);

        let collection = entry.id.clone();
        let client = client.clone();
        let policy = policy.clone();
        let sink = sink.clone();
        let cancelled = cancelled.clone();
        let limiter = limiter.clone();
        let server_error_fatal = config.retry.server_error_fatal;
        let stagger_max = config.harvest.stagger_max;

        let handle = join_set.spawn(async move {
            // Fetching is gated by the limiter, but every task starts now
            let _permit = match &limiter {
                Some(semaphore) => semaphore.clone().acquire_owned().await.ok(),
                None => None,
            };

            if stagger_max > 0.0 {
                tokio::time::sleep(Duration::from_secs_f64(fastrand::f64() * stagger_max)).await;
            }

            walk_collection(
                &client,
                &collection,
                initial,
                aggregator,
                &policy,
                server_error_fatal,
                &sink,
                &cancelled,
            )
            .await
        });

        spawned.insert(handle.id(), entry.id.clone());
    }

    // Merge reports as walkers finish, not in submission order
    let mut results = HashMap::new();
    while let Some(joined) = join_set.join_next_with_id().await {
        match joined {
            Ok((task_id, report)) => {
                spawned.remove(&task_id);
                results.insert(report.collection.clone(), report);
            }
            Err(join_error) => {
                // A walker died outside the failure taxonomy (panic).
                // Contain it: log, record, hand back an empty report.
                let collection = spawned
                    .remove(&join_error.id())
                    .unwrap_or_else(|| "<unknown>".to_string());
                tracing::error!("Worker for {} died unexpectedly: {}", collection, join_error);

                let record = FailureRecord::new(
                    &collection,
                    0,
                    format!("Worker failed unexpectedly: {}", join_error),
                    None,
                );
                if let Err(e) = sink.append(&record) {
                    tracing::error!("Failed to record worker failure: {}", e);
                }

                results.insert(
                    collection.clone(),
                    CollectionReport {
                        collection,
                        status: HarvestStatus::Aborted,
                        pages_fetched: 0,
                        items_seen: 0,
                        output: AggregateOutput::Empty,
                    },
                );
            }
        }
    }

    tracing::info!(
        "Harvest finished: {} collections, {} failures recorded",
        results.len(),
        sink.recorded()
    );

    Ok(results)
}
