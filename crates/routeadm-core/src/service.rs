//! The standard service contract consumed by collections

use async_trait::async_trait;
use routeadm_api::{BatchDeleteReport, ErrorCode, QueryParams, ResourceId, StandardResult};
use routeadm_client::RestResource;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Message returned by services without a batch delete endpoint
pub const BATCH_UNSUPPORTED: &str = "batch delete is not supported";

/// Uniform four-verb service, with optional batch delete
///
/// Implementations never fail with `Err`: every outcome, including transport
/// failures, is a [`StandardResult`].
#[async_trait]
pub trait StandardService<T: Send + 'static>: Send + Sync {
    /// List one page of records
    async fn get_list(&self, params: QueryParams) -> StandardResult<Vec<T>>;

    /// Create a record
    async fn create(&self, record: T) -> StandardResult<T>;

    /// Replace a record
    async fn update(&self, id: ResourceId, record: T) -> StandardResult<T>;

    /// Delete a record
    async fn delete(&self, id: ResourceId) -> StandardResult<Value>;

    /// Whether [`batch_delete`](Self::batch_delete) reaches a backend
    fn supports_batch_delete(&self) -> bool {
        false
    }

    /// Delete several records in one call
    async fn batch_delete(&self, ids: Vec<ResourceId>) -> StandardResult<BatchDeleteReport> {
        tracing::debug!(ids = ids.len(), "batch delete requested on a service without it");
        StandardResult::failure(ErrorCode::Request, BATCH_UNSUPPORTED)
    }
}

#[async_trait]
impl<T> StandardService<T> for RestResource<T>
where
    T: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    async fn get_list(&self, params: QueryParams) -> StandardResult<Vec<T>> {
        self.list(&params).await
    }

    async fn create(&self, record: T) -> StandardResult<T> {
        RestResource::create(self, &record).await
    }

    async fn update(&self, id: ResourceId, record: T) -> StandardResult<T> {
        RestResource::update(self, &id, &record).await
    }

    async fn delete(&self, id: ResourceId) -> StandardResult<Value> {
        RestResource::delete(self, &id).await
    }

    fn supports_batch_delete(&self) -> bool {
        true
    }

    async fn batch_delete(&self, ids: Vec<ResourceId>) -> StandardResult<BatchDeleteReport> {
        RestResource::batch_delete(self, &ids).await
    }
}
