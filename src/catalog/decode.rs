//! Page payload decoding
//!
//! The wire contract is deliberately minimal: a page payload is a JSON
//! object carrying an ordered `features` array of items and an optional
//! `links` entry with `rel = "next"` whose `href` locates the following
//! page. Nothing else in the payload is interpreted.

use crate::catalog::item::{CatalogItem, ItemPage, PageRef};
use crate::DecodeError;
use serde_json::Value;
use url::Url;

/// Decodes one raw page payload into items plus the next page reference
///
/// # Arguments
///
/// * `body` - The raw response body of a page request
///
/// # Returns
///
/// * `Ok(ItemPage)` - The decoded page
/// * `Err(DecodeError)` - The payload is malformed; the caller treats
///   this as fatal for the collection
pub fn decode_page(body: &str) -> Result<ItemPage, DecodeError> {
    let payload: Value = serde_json::from_str(body)?;

    if !payload.is_object() {
        return Err(DecodeError::NotAnObject);
    }

    let items = match payload.get("features") {
        None => Vec::new(),
        Some(Value::Array(features)) => features.iter().cloned().map(CatalogItem::new).collect(),
        Some(_) => return Err(DecodeError::BadField("features")),
    };

    let next = next_link(&payload)?;

    Ok(ItemPage { items, next })
}

/// Extracts the `rel = "next"` link from a page payload, if any
fn next_link(payload: &Value) -> Result<Option<PageRef>, DecodeError> {
    let links = match payload.get("links") {
        None => return Ok(None),
        Some(Value::Array(links)) => links,
        Some(_) => return Err(DecodeError::BadField("links")),
    };

    let href = links
        .iter()
        .find(|link| link.get("rel").and_then(Value::as_str) == Some("next"))
        .and_then(|link| link.get("href").and_then(Value::as_str));

    match href {
        None => Ok(None),
        Some(href) => {
            let url =
                Url::parse(href).map_err(|_| DecodeError::BadNextLink(href.to_string()))?;
            Ok(Some(PageRef::new(url)))
        }
    }
}
