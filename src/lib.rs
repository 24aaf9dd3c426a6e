//! Monty-Harvest: a concurrent item-catalog harvester
//!
//! This crate walks the paginated collections of a remote item catalog,
//! one worker per collection, retrying transient failures with jittered
//! exponential backoff, folding the harvested items into a pluggable
//! aggregation strategy, and recording every terminal failure to a
//! durable JSON-lines error log.

pub mod aggregate;
pub mod catalog;
pub mod config;
pub mod harvester;
pub mod output;
pub mod sink;

use thiserror::Error;

/// Main error type for Monty-Harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Page decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Error log serialization failed: {0}")]
    SinkSerialize(#[from] serde_json::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Errors raised while decoding a page payload
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Payload is not a JSON object")]
    NotAnObject,

    #[error("Field '{0}' has the wrong shape")]
    BadField(&'static str),

    #[error("Next link is not a valid URL: {0}")]
    BadNextLink(String),
}

/// Result type alias for Monty-Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use catalog::{CatalogItem, ItemPage, PageRef};
pub use config::Config;
pub use harvester::{run_harvest, CollectionReport, HarvestStatus};
pub use sink::{ErrorSink, FailureRecord};
