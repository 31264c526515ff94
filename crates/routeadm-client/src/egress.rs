//! Egress rule service
//!
//! The egress endpoints predate the REST conventions: the list endpoint takes
//! `pageNo`/`size`/`keyword` and answers with an `{ items, total }` page.

use routeadm_api::models::Egress;
use routeadm_api::{QueryParams, ResourceId, StandardResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::http::HttpClient;

const ENDPOINT: &str = "/v1/egress";

/// Filter accepted by the egress list endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EgressFilter {
    pub page_no: u64,
    pub size: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyword: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    /// Other filters, sent as they are
    #[serde(flatten)]
    pub extra: QueryParams,
}

impl Default for EgressFilter {
    fn default() -> Self {
        Self {
            page_no: 1,
            size: 10,
            keyword: None,
            protocol: None,
            enabled: None,
            extra: QueryParams::new(),
        }
    }
}

impl EgressFilter {
    fn to_query(&self) -> QueryParams {
        self.extra
            .clone()
            .with("pageNo", self.page_no)
            .with("size", self.size)
            .with("keyword", self.keyword.clone())
            .with("protocol", self.protocol.clone())
            .with("enabled", self.enabled)
    }
}

/// One page of egress rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EgressPage {
    pub items: Vec<Egress>,
    #[serde(default)]
    pub total: u64,
}

/// Service for egress rules
#[derive(Clone)]
pub struct EgressService {
    client: HttpClient,
}

impl EgressService {
    /// Create a new egress service
    #[must_use]
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }

    /// Fetch one page of egress rules
    pub async fn get_egress_list(&self, filter: &EgressFilter) -> StandardResult<EgressPage> {
        self.client.get(ENDPOINT, &filter.to_query()).await
    }

    /// Create an egress rule
    pub async fn create_egress(&self, egress: &Egress) -> StandardResult<Egress> {
        self.client.post(ENDPOINT, egress).await
    }

    /// Update an egress rule
    pub async fn update_egress(&self, id: &ResourceId, egress: &Egress) -> StandardResult<Egress> {
        self.client.put(&format!("{ENDPOINT}/{id}"), egress).await
    }

    /// Remove an egress rule
    pub async fn remove_egress(&self, id: &ResourceId) -> StandardResult<Value> {
        self.client.delete(&format!("{ENDPOINT}/{id}")).await
    }
}
