//! Shared helpers for the integration tests

use monty_harvest::config::{
    CatalogConfig, CollectionEntry, Config, HarvestConfig, HarvestMode, OutputConfig, QueryConfig,
    RetryConfig,
};
use serde_json::{json, Value};
use std::path::Path;

/// Builds a test configuration pointed at a mock catalog
///
/// The retry profile uses a small backoff base so retries past the
/// first stay fast, and zero jitter so timings are stable.
pub fn test_config(
    base_url: &str,
    dir: &Path,
    mode: HarvestMode,
    collections: &[&str],
) -> Config {
    Config {
        catalog: CatalogConfig {
            base_url: base_url.to_string(),
        },
        query: QueryConfig {
            page_limit: 10,
            datetime_range: None,
            bbox: None,
            sortby: Some("+datetime".to_string()),
            fields: None,
        },
        harvest: HarvestConfig {
            mode,
            count_property: "monty:country_codes".to_string(),
            sample_role: None,
            max_samples: 1,
            max_concurrent_collections: 0,
            stagger_max: 0.0,
        },
        retry: RetryConfig {
            max_attempts: 3,
            backoff_base: 0.01,
            jitter_max: 0.0,
            request_timeout: 5,
            server_error_fatal: true,
        },
        output: OutputConfig {
            results_path: dir.join("results.out").to_string_lossy().into_owned(),
            errors_path: dir.join("errors.jsonl").to_string_lossy().into_owned(),
        },
        collections: collections
            .iter()
            .map(|id| CollectionEntry {
                id: id.to_string(),
                min_year: 100,
                skip_first_of_month: false,
            })
            .collect(),
    }
}

/// One item carrying country codes, for count harvests
pub fn count_item(id: &str, codes: &[&str]) -> Value {
    json!({"id": id, "properties": {"monty:country_codes": codes}})
}

/// One item carrying a datetime, for oldest-item harvests
pub fn dated_item(id: &str, datetime: &str) -> Value {
    json!({
        "id": id,
        "properties": {"datetime": datetime, "title": format!("Event {}", id)}
    })
}

/// Assembles a page payload with an optional next link
pub fn page_json(features: Vec<Value>, next: Option<String>) -> Value {
    let mut links = vec![json!({"rel": "self", "href": "https://catalog.test/self"})];
    if let Some(href) = next {
        links.push(json!({"rel": "next", "href": href}));
    }
    json!({"features": features, "links": links})
}

/// The initial items path for a collection
pub fn items_path(collection: &str) -> String {
    format!("/collections/{}/items", collection)
}

/// Reads the error log lines written during a run
pub fn error_lines(config: &Config) -> Vec<Value> {
    let content = std::fs::read_to_string(&config.output.errors_path).unwrap_or_default();
    content
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}
