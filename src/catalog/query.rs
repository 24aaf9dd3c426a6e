//! Initial query construction
//!
//! Builds the first page reference for a collection from the configured
//! query parameters. Every later page reference comes from the server's
//! `next` link, so this is the only place query parameters exist.

use crate::catalog::item::PageRef;
use crate::config::QueryConfig;
use crate::{ConfigError, ConfigResult};
use url::Url;

/// Builds the initial page reference for one collection
///
/// # Arguments
///
/// * `base_url` - The catalog base URL
/// * `collection` - The collection identifier
/// * `query` - The configured query parameters
///
/// # Returns
///
/// * `Ok(PageRef)` - The `/collections/{id}/items` URL with all
///   configured parameters attached
/// * `Err(ConfigError)` - The base URL cannot carry path segments
pub fn build_initial_query(
    base_url: &str,
    collection: &str,
    query: &QueryConfig,
) -> ConfigResult<PageRef> {
    let mut url = Url::parse(base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url: {}", e)))?;

    url.path_segments_mut()
        .map_err(|_| ConfigError::InvalidUrl(format!("base-url cannot carry a path: {}", base_url)))?
        .pop_if_empty()
        .extend(["collections", collection, "items"]);

    {
        let mut pairs = url.query_pairs_mut();
        pairs.append_pair("limit", &query.page_limit.to_string());

        if let Some(range) = &query.datetime_range {
            pairs.append_pair("datetime", range);
        }
        if let Some(bbox) = &query.bbox {
            pairs.append_pair("bbox", bbox);
        }
        if let Some(sortby) = &query.sortby {
            pairs.append_pair("sortby", sortby);
        }
        if let Some(fields) = &query.fields {
            pairs.append_pair("fields", fields);
        }
    }

    Ok(PageRef::new(url))
}
