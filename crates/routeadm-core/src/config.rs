//! Collection options

use routeadm_api::QueryParams;
use routeadm_api::responses::DEFAULT_PAGE_SIZE;
use serde::{Deserialize, Serialize};

/// Options for a [`Collection`](crate::Collection)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionOptions {
    /// Load the first page on mount
    #[serde(default = "default_immediate")]
    pub immediate: bool,
    /// Initial page size
    #[serde(default = "default_page_size")]
    pub page_size: u64,
    /// Initial filter params
    #[serde(default)]
    pub params: QueryParams,
    /// Resource name used in notices, e.g. `route`
    #[serde(default = "default_label")]
    pub label: String,
}

fn default_immediate() -> bool {
    true
}

fn default_page_size() -> u64 {
    DEFAULT_PAGE_SIZE
}

fn default_label() -> String {
    "record".to_string()
}

impl Default for CollectionOptions {
    fn default() -> Self {
        Self {
            immediate: default_immediate(),
            page_size: default_page_size(),
            params: QueryParams::new(),
            label: default_label(),
        }
    }
}

impl CollectionOptions {
    /// Options for a resource with the given label
    #[must_use]
    pub fn labeled(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Self::default()
        }
    }

    /// Set whether mounting loads immediately
    #[must_use]
    pub fn with_immediate(mut self, immediate: bool) -> Self {
        self.immediate = immediate;
        self
    }

    /// Set the initial page size
    #[must_use]
    pub fn with_page_size(mut self, page_size: u64) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Set the initial filter params
    #[must_use]
    pub fn with_params(mut self, params: QueryParams) -> Self {
        self.params = params;
        self
    }
}
