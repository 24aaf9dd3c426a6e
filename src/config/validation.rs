use crate::config::types::{
    CatalogConfig, CollectionEntry, Config, HarvestConfig, HarvestMode, OutputConfig, QueryConfig,
    RetryConfig,
};
use crate::ConfigError;
use std::collections::HashSet;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_catalog_config(&config.catalog)?;
    validate_query_config(&config.query)?;
    validate_harvest_config(&config.harvest)?;
    validate_retry_config(&config.retry)?;
    validate_output_config(&config.output)?;
    validate_collections(&config.collections)?;
    Ok(())
}

/// Validates the catalog endpoint configuration
fn validate_catalog_config(config: &CatalogConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "base-url must be http or https, got '{}'",
            url.scheme()
        )));
    }

    Ok(())
}

/// Validates the query parameters
fn validate_query_config(config: &QueryConfig) -> Result<(), ConfigError> {
    if config.page_limit < 1 {
        return Err(ConfigError::Validation(format!(
            "page-limit must be >= 1, got {}",
            config.page_limit
        )));
    }

    if let Some(range) = &config.datetime_range {
        if !range.contains('/') {
            return Err(ConfigError::Validation(format!(
                "datetime-range must be an interval 'start/end', got '{}'",
                range
            )));
        }
    }

    Ok(())
}

/// Validates the harvest mode configuration
fn validate_harvest_config(config: &HarvestConfig) -> Result<(), ConfigError> {
    if config.mode == HarvestMode::CountryCounts && config.count_property.is_empty() {
        return Err(ConfigError::Validation(
            "count-property cannot be empty in country-counts mode".to_string(),
        ));
    }

    if config.mode == HarvestMode::FirstRecords && config.max_samples < 1 {
        return Err(ConfigError::Validation(format!(
            "max-samples must be >= 1 in first-records mode, got {}",
            config.max_samples
        )));
    }

    if !(0.0..=10.0).contains(&config.stagger_max) {
        return Err(ConfigError::Validation(format!(
            "stagger-max must be between 0 and 10 seconds, got {}",
            config.stagger_max
        )));
    }

    Ok(())
}

/// Validates the retry profile
fn validate_retry_config(config: &RetryConfig) -> Result<(), ConfigError> {
    if config.max_attempts < 1 {
        return Err(ConfigError::Validation(format!(
            "max-attempts must be >= 1, got {}",
            config.max_attempts
        )));
    }

    if config.backoff_base <= 0.0 {
        return Err(ConfigError::Validation(format!(
            "backoff-base must be > 0, got {}",
            config.backoff_base
        )));
    }

    if !(0.0..=1.0).contains(&config.jitter_max) {
        return Err(ConfigError::Validation(format!(
            "jitter-max must be between 0 and 1 second, got {}",
            config.jitter_max
        )));
    }

    if config.request_timeout < 1 {
        return Err(ConfigError::Validation(format!(
            "request-timeout must be >= 1 second, got {}",
            config.request_timeout
        )));
    }

    Ok(())
}

/// Validates output paths
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.results_path.is_empty() {
        return Err(ConfigError::Validation(
            "results-path cannot be empty".to_string(),
        ));
    }

    if config.errors_path.is_empty() {
        return Err(ConfigError::Validation(
            "errors-path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates the collection list
fn validate_collections(collections: &[CollectionEntry]) -> Result<(), ConfigError> {
    if collections.is_empty() {
        return Err(ConfigError::Validation(
            "at least one [[collections]] entry is required".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    for entry in collections {
        if entry.id.is_empty() {
            return Err(ConfigError::Validation(
                "collection id cannot be empty".to_string(),
            ));
        }

        if !seen.insert(entry.id.as_str()) {
            return Err(ConfigError::Validation(format!(
                "duplicate collection id '{}'",
                entry.id
            )));
        }
    }

    Ok(())
}
