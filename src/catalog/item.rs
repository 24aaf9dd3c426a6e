//! Catalog data model: items, pages, and page references

use serde_json::Value;
use url::Url;

/// Opaque locator for one page of a collection
///
/// Starts life as the initial query URL built by [`build_initial_query`]
/// and is replaced by the server-supplied continuation URL after each
/// successful fetch.
///
/// [`build_initial_query`]: crate::catalog::build_initial_query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRef(Url);

impl PageRef {
    pub fn new(url: Url) -> Self {
        Self(url)
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn url(&self) -> &Url {
        &self.0
    }
}

impl std::fmt::Display for PageRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One page of a collection: an ordered batch of items plus the
/// reference to the next page, absent once pagination is exhausted
#[derive(Debug)]
pub struct ItemPage {
    pub items: Vec<CatalogItem>,
    pub next: Option<PageRef>,
}

/// One harvested record
///
/// The harvester treats items as opaque JSON objects; the accessors here
/// are tolerant and return nothing for missing or oddly-shaped fields,
/// so a malformed item contributes zero signal instead of failing the
/// collection.
#[derive(Debug, Clone)]
pub struct CatalogItem(Value);

impl CatalogItem {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// The item identifier, if present
    pub fn id(&self) -> Option<&str> {
        self.0.get("id").and_then(Value::as_str)
    }

    /// A string-valued field of the item's `properties` object
    pub fn property_str(&self, key: &str) -> Option<&str> {
        self.0
            .get("properties")
            .and_then(|p| p.get(key))
            .and_then(Value::as_str)
    }

    /// A list-valued field of the item's `properties` object
    ///
    /// Non-string entries inside the list are skipped. A missing field or
    /// a field that is not a list yields an empty vector.
    pub fn property_list(&self, key: &str) -> Vec<&str> {
        self.0
            .get("properties")
            .and_then(|p| p.get(key))
            .and_then(Value::as_array)
            .map(|values| values.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    /// Whether the item's `roles` property contains the given role
    pub fn has_role(&self, role: &str) -> bool {
        self.property_list("roles").contains(&role)
    }

    /// Consumes the item, returning the raw JSON record
    pub fn into_value(self) -> Value {
        self.0
    }

    /// The raw JSON record
    pub fn as_value(&self) -> &Value {
        &self.0
    }
}
