//! Flat-file result writers
//!
//! One writer per harvest mode. Rows are emitted in sorted collection
//! order so two runs over identical inputs produce byte-identical files.

use crate::aggregate::AggregateOutput;
use crate::harvester::CollectionReport;
use crate::Result;
use std::collections::HashMap;
use std::path::Path;

/// Quotes a CSV field when it contains a delimiter, quote, or newline
fn csv_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn sorted_collections(reports: &HashMap<String, CollectionReport>) -> Vec<&CollectionReport> {
    let mut sorted: Vec<&CollectionReport> = reports.values().collect();
    sorted.sort_by(|a, b| a.collection.cmp(&b.collection));
    sorted
}

/// Writes the country-counts CSV: one row per (collection, category)
pub fn write_country_counts(
    path: &Path,
    reports: &HashMap<String, CollectionReport>,
) -> Result<()> {
    let mut out = String::from("collection,category,count\n");

    for report in sorted_collections(reports) {
        let AggregateOutput::Counts(counts) = &report.output else {
            continue;
        };

        let mut rows: Vec<(&String, &u64)> = counts.iter().collect();
        rows.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));

        for (category, count) in rows {
            out.push_str(&format!(
                "{},{},{}\n",
                csv_field(&report.collection),
                csv_field(category),
                count
            ));
        }
    }

    std::fs::write(path, out)?;
    Ok(())
}

/// Writes the oldest-items CSV: one row per collection, empty fields for
/// collections where nothing valid was found
pub fn write_oldest_items(path: &Path, reports: &HashMap<String, CollectionReport>) -> Result<()> {
    let mut out = String::from("collection,item_id,datetime,title,description\n");

    for report in sorted_collections(reports) {
        let AggregateOutput::Oldest(found) = &report.output else {
            continue;
        };

        match found {
            Some(record) => out.push_str(&format!(
                "{},{},{},{},{}\n",
                csv_field(&report.collection),
                csv_field(&record.item_id),
                csv_field(&record.datetime),
                csv_field(&record.title),
                csv_field(&record.description)
            )),
            None => out.push_str(&format!("{},,,,\n", csv_field(&report.collection))),
        }
    }

    std::fs::write(path, out)?;
    Ok(())
}

/// Writes the first-records JSON: an array of per-collection sample sets
pub fn write_first_records(
    path: &Path,
    reports: &HashMap<String, CollectionReport>,
) -> Result<()> {
    let mut entries = Vec::new();

    for report in sorted_collections(reports) {
        let AggregateOutput::Samples(records) = &report.output else {
            continue;
        };

        entries.push(serde_json::json!({
            "collection": report.collection,
            "records": records,
        }));
    }

    let rendered = serde_json::to_string_pretty(&serde_json::Value::Array(entries))?;
    std::fs::write(path, rendered)?;
    Ok(())
}
