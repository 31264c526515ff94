//! Request types for the API

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Reserved query key for the 1-based page number
pub const PAGE: &str = "page";
/// Reserved query key for the page size
pub const PAGE_SIZE: &str = "pageSize";
/// Reserved query key for the free-text search term
pub const SEARCH: &str = "search";

/// Open key/value bag sent as the query string of list requests
///
/// `page`, `pageSize` and `search` are reserved. Every other key is a
/// resource-specific filter and passes through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueryParams(BTreeMap<String, Value>);

impl QueryParams {
    /// Create an empty parameter bag
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a key, replacing any previous value
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Set a key in place
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    /// Remove a key, returning its value
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    /// Raw value for a key
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Requested page, if set
    #[must_use]
    pub fn page(&self) -> Option<u64> {
        self.get(PAGE).and_then(value_as_u64)
    }

    /// Requested page size, if set
    #[must_use]
    pub fn page_size(&self) -> Option<u64> {
        self.get(PAGE_SIZE).and_then(value_as_u64)
    }

    /// Search term, if set and non-empty
    #[must_use]
    pub fn search(&self) -> Option<&str> {
        self.get(SEARCH)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }

    /// Set page and page size
    #[must_use]
    pub fn with_paging(mut self, page: u64, page_size: u64) -> Self {
        self.insert(PAGE, page);
        self.insert(PAGE_SIZE, page_size);
        self
    }

    /// Iterate over resource-specific filters (everything except reserved keys)
    pub fn filters(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0
            .iter()
            .filter(|(k, _)| !matches!(k.as_str(), PAGE | PAGE_SIZE | SEARCH))
            .map(|(k, v)| (k.as_str(), v))
    }

    /// Iterate over every key
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Whether the bag is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Flatten into query-string pairs
    ///
    /// Null values are skipped. Arrays are joined with commas, objects are
    /// sent as compact JSON.
    #[must_use]
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        self.0
            .iter()
            .filter_map(|(k, v)| query_value(v).map(|v| (k.clone(), v)))
            .collect()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

fn value_as_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

fn query_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(query_value)
                .collect::<Vec<_>>()
                .join(","),
        ),
        Value::Object(_) => Some(value.to_string()),
    }
}

/// Identifier of a backend record
///
/// Some resources use numeric ids, others string ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResourceId {
    Num(i64),
    Text(String),
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Num(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for ResourceId {
    fn from(id: i64) -> Self {
        Self::Num(id)
    }
}

impl From<&str> for ResourceId {
    fn from(id: &str) -> Self {
        id.parse().map_or_else(|_| Self::Text(id.to_string()), Self::Num)
    }
}

impl From<String> for ResourceId {
    fn from(id: String) -> Self {
        id.parse().map_or(Self::Text(id), Self::Num)
    }
}

/// Body of a batch delete request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchDeleteRequest {
    pub ids: Vec<ResourceId>,
}
