//! Monty-Harvest main entry point
//!
//! Command-line interface for the concurrent item-catalog harvester.

use anyhow::Context;
use clap::Parser;
use monty_harvest::config::{load_config_with_hash, Config, HarvestMode};
use monty_harvest::harvester::run_harvest_with_sink;
use monty_harvest::output::{print_summary, write_results};
use monty_harvest::sink::ErrorSink;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Monty-Harvest: a concurrent item-catalog harvester
///
/// Walks every configured catalog collection in parallel, retries
/// transient failures with exponential backoff, aggregates the harvested
/// items, and writes the results to a flat output file. Failures are
/// logged to an append-only error file; the process itself always exits
/// cleanly once the harvest has started.
#[derive(Parser, Debug)]
#[command(name = "monty-harvest")]
#[command(version)]
#[command(about = "A concurrent item-catalog harvester", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be harvested without making
    /// any network calls
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) =
        load_config_with_hash(&cli.config).context("Failed to load configuration")?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    handle_harvest(&config).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("monty_harvest=info,warn"),
            1 => EnvFilter::new("monty_harvest=debug,info"),
            2 => EnvFilter::new("monty_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: validates config and prints the plan
fn handle_dry_run(config: &Config) {
    println!("=== Monty-Harvest Dry Run ===\n");

    println!("Catalog:");
    println!("  Base URL: {}", config.catalog.base_url);

    println!("\nQuery:");
    println!("  Page limit: {}", config.query.page_limit);
    if let Some(range) = &config.query.datetime_range {
        println!("  Datetime: {}", range);
    }
    if let Some(bbox) = &config.query.bbox {
        println!("  Bounding box: {}", bbox);
    }
    if let Some(sortby) = &config.query.sortby {
        println!("  Sort: {}", sortby);
    }
    if let Some(fields) = &config.query.fields {
        println!("  Fields: {}", fields);
    }

    println!("\nHarvest:");
    let mode = match config.harvest.mode {
        HarvestMode::CountryCounts => "country-counts",
        HarvestMode::OldestItem => "oldest-item",
        HarvestMode::FirstRecords => "first-records",
    };
    println!("  Mode: {}", mode);
    if config.harvest.mode == HarvestMode::CountryCounts {
        println!("  Counted property: {}", config.harvest.count_property);
    }
    match config.harvest.max_concurrent_collections {
        0 => println!("  Concurrency: one worker per collection"),
        bound => println!("  Concurrency: at most {} collections at once", bound),
    }

    println!("\nRetry:");
    println!("  Max attempts: {}", config.retry.max_attempts);
    println!(
        "  Backoff: {}^attempt + jitter up to {}s",
        config.retry.backoff_base, config.retry.jitter_max
    );
    println!("  Request timeout: {}s", config.retry.request_timeout);
    println!(
        "  HTTP 500 is {}",
        if config.retry.server_error_fatal {
            "fatal for the collection"
        } else {
            "retried like any other failure"
        }
    );

    println!("\nOutput:");
    println!("  Results: {}", config.output.results_path);
    println!("  Error log: {}", config.output.errors_path);

    println!("\nCollections ({}):", config.collections.len());
    for entry in &config.collections {
        println!("  - {}", entry.id);
    }

    println!("\n\u{2713} Configuration is valid");
    println!(
        "\u{2713} Would harvest {} collections",
        config.collections.len()
    );
}

/// Handles the main harvest operation
async fn handle_harvest(config: &Config) -> anyhow::Result<()> {
    // The sink is initialized (and the previous run's log truncated)
    // strictly before any worker is scheduled
    let sink = Arc::new(
        ErrorSink::create(Path::new(&config.output.errors_path))
            .context("Failed to initialize error log")?,
    );

    let cancelled = Arc::new(AtomicBool::new(false));
    let cancel_flag = cancelled.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, finishing in-flight pages");
            cancel_flag.store(true, Ordering::Relaxed);
        }
    });

    let reports = run_harvest_with_sink(config, sink.clone(), cancelled)
        .await
        .context("Harvest setup failed")?;

    write_results(
        config.harvest.mode,
        Path::new(&config.output.results_path),
        &reports,
    )
    .context("Failed to write results")?;
    tracing::info!("Results saved to {}", config.output.results_path);

    print_summary(&reports, &sink);

    // Per-collection failures are reported through the error log, not
    // the exit code
    Ok(())
}
