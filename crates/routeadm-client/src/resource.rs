//! Conventional REST resources under `/v1/<resource>`

use std::marker::PhantomData;

use routeadm_api::{
    BatchDeleteReport, BatchDeleteRequest, QueryParams, ResourceId, StandardResult,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::http::HttpClient;

/// Service for a resource that follows the backend's REST conventions
///
/// - `GET    /v1/<resource>?page=&pageSize=&...` lists
/// - `POST   /v1/<resource>` creates
/// - `PUT    /v1/<resource>/<id>` updates
/// - `DELETE /v1/<resource>/<id>` deletes
/// - `POST   /v1/<resource>/batch-delete` deletes many
pub struct RestResource<T> {
    client: HttpClient,
    endpoint: String,
    _record: PhantomData<fn() -> T>,
}

impl<T> Clone for RestResource<T> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            endpoint: self.endpoint.clone(),
            _record: PhantomData,
        }
    }
}

impl<T> RestResource<T>
where
    T: Serialize + DeserializeOwned + Sync,
{
    /// Create a service for `/v1/<resource>`
    #[must_use]
    pub fn new(client: HttpClient, resource: &str) -> Self {
        Self {
            client,
            endpoint: format!("/v1/{}", resource.trim_matches('/')),
            _record: PhantomData,
        }
    }

    /// Collection endpoint
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn member(&self, id: &ResourceId) -> String {
        format!("{}/{id}", self.endpoint)
    }

    /// List records
    pub async fn list(&self, params: &QueryParams) -> StandardResult<Vec<T>> {
        self.client.get(&self.endpoint, params).await
    }

    /// Create a record
    pub async fn create(&self, record: &T) -> StandardResult<T> {
        self.client.post(&self.endpoint, record).await
    }

    /// Replace a record
    pub async fn update(&self, id: &ResourceId, record: &T) -> StandardResult<T> {
        self.client.put(&self.member(id), record).await
    }

    /// Delete a record
    pub async fn delete(&self, id: &ResourceId) -> StandardResult<Value> {
        self.client.delete(&self.member(id)).await
    }

    /// Delete several records in one request
    pub async fn batch_delete(&self, ids: &[ResourceId]) -> StandardResult<BatchDeleteReport> {
        let request = BatchDeleteRequest { ids: ids.to_vec() };
        self.client
            .post(&format!("{}/batch-delete", self.endpoint), &request)
            .await
    }
}
