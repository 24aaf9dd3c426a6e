use serde::Deserialize;

/// Main configuration structure for Monty-Harvest
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub query: QueryConfig,
    pub harvest: HarvestConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    pub output: OutputConfig,
    #[serde(default)]
    pub collections: Vec<CollectionEntry>,
}

/// Remote catalog endpoint configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    /// Base URL of the catalog API (the `/collections/{id}/items`
    /// endpoints hang off this)
    #[serde(rename = "base-url")]
    pub base_url: String,
}

/// Parameters of the initial page query sent to every collection
#[derive(Debug, Clone, Deserialize)]
pub struct QueryConfig {
    /// Number of items requested per page
    #[serde(rename = "page-limit", default = "default_page_limit")]
    pub page_limit: u32,

    /// Datetime interval filter, e.g. "2024-01-01T00:00:00Z/2024-06-30T23:59:59Z"
    #[serde(rename = "datetime-range")]
    pub datetime_range: Option<String>,

    /// Bounding box filter, e.g. "-12,34,40,72"
    pub bbox: Option<String>,

    /// Sort key, e.g. "+datetime" to receive items oldest-first
    pub sortby: Option<String>,

    /// Comma-separated field selection to shrink responses
    pub fields: Option<String>,
}

/// Harvest mode and worker-pool configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HarvestConfig {
    /// Aggregation mode for this run
    pub mode: HarvestMode,

    /// List-valued item property counted in country-counts mode
    #[serde(rename = "count-property", default = "default_count_property")]
    pub count_property: String,

    /// Optional role an item must carry to be sampled in first-records mode
    #[serde(rename = "sample-role")]
    pub sample_role: Option<String>,

    /// Number of records retained per collection in first-records mode
    #[serde(rename = "max-samples", default = "default_max_samples")]
    pub max_samples: u32,

    /// Upper bound on collections fetching at once; 0 means one worker
    /// per collection with no bound
    #[serde(rename = "max-concurrent-collections", default)]
    pub max_concurrent_collections: u32,

    /// Upper bound in seconds of the random per-worker start delay
    #[serde(rename = "stagger-max", default)]
    pub stagger_max: f64,
}

/// The aggregation strategy applied to every collection in a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum HarvestMode {
    /// Count occurrences of a category property across all items
    #[serde(rename = "country-counts")]
    CountryCounts,

    /// Find the first item with a plausible timestamp, oldest-first
    #[serde(rename = "oldest-item")]
    OldestItem,

    /// Keep the first few raw records of each collection
    #[serde(rename = "first-records")]
    FirstRecords,
}

/// Retry and failure-classification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RetryConfig {
    /// Total fetch attempts per page before giving up on the collection
    #[serde(rename = "max-attempts", default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Base of the exponential backoff, in seconds
    #[serde(rename = "backoff-base", default = "default_backoff_base")]
    pub backoff_base: f64,

    /// Upper bound of the uniform jitter added to each backoff, in seconds
    #[serde(rename = "jitter-max", default = "default_jitter_max")]
    pub jitter_max: f64,

    /// Per-request timeout in seconds
    #[serde(rename = "request-timeout", default = "default_request_timeout")]
    pub request_timeout: u64,

    /// Whether HTTP 500 aborts the collection immediately instead of
    /// being retried like any other failing status
    #[serde(rename = "server-error-fatal", default = "default_server_error_fatal")]
    pub server_error_fatal: bool,
}

/// Output file configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path the aggregated results are written to (CSV or JSON,
    /// depending on the harvest mode)
    #[serde(rename = "results-path")]
    pub results_path: String,

    /// Path of the append-only JSON-lines failure log
    #[serde(rename = "errors-path")]
    pub errors_path: String,
}

/// One collection to harvest, with optional per-collection validity rules
/// used by the oldest-item mode
#[derive(Debug, Clone, Deserialize)]
pub struct CollectionEntry {
    /// Collection identifier, e.g. "gdacs-events"
    pub id: String,

    /// Years at or below this value are rejected as implausible
    #[serde(rename = "min-year", default = "default_min_year")]
    pub min_year: i32,

    /// Reject timestamps falling on the first day of a month (some
    /// sources default unknown days to 01)
    #[serde(rename = "skip-first-of-month", default)]
    pub skip_first_of_month: bool,
}

fn default_page_limit() -> u32 {
    100
}

fn default_count_property() -> String {
    "monty:country_codes".to_string()
}

fn default_max_samples() -> u32 {
    1
}

fn default_max_attempts() -> u32 {
    10
}

fn default_backoff_base() -> f64 {
    2.0
}

fn default_jitter_max() -> f64 {
    0.2
}

fn default_request_timeout() -> u64 {
    60
}

fn default_server_error_fatal() -> bool {
    true
}

fn default_min_year() -> i32 {
    100
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            page_limit: default_page_limit(),
            datetime_range: None,
            bbox: None,
            sortby: None,
            fields: None,
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            backoff_base: default_backoff_base(),
            jitter_max: default_jitter_max(),
            request_timeout: default_request_timeout(),
            server_error_fatal: default_server_error_fatal(),
        }
    }
}
