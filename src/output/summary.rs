//! End-of-run summary printing

use crate::harvester::{CollectionReport, HarvestStatus};
use crate::sink::ErrorSink;
use std::collections::HashMap;

/// Prints the per-collection outcome table and the error-log notice
pub fn print_summary(reports: &HashMap<String, CollectionReport>, sink: &ErrorSink) {
    let mut sorted: Vec<&CollectionReport> = reports.values().collect();
    sorted.sort_by(|a, b| a.collection.cmp(&b.collection));

    println!("\n=== Harvest summary ===");
    for report in &sorted {
        let status = match report.status {
            HarvestStatus::Completed => "completed",
            HarvestStatus::Partial => "partial",
            HarvestStatus::Aborted => "aborted",
        };
        println!(
            "  {}: {} ({} pages, {} items)",
            report.collection, status, report.pages_fetched, report.items_seen
        );
    }

    let total_items: u64 = sorted.iter().map(|r| r.items_seen).sum();
    println!(
        "\n{} collections processed, {} items total",
        sorted.len(),
        total_items
    );

    if sink.is_empty() {
        println!("Processing completed with no errors.");
    } else {
        println!(
            "{} errors were encountered and written to {}",
            sink.recorded(),
            sink.path().display()
        );
    }
}
