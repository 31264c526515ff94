//! Service adapter: maps a backend service with arbitrary method names onto
//! [`StandardService`]
//!
//! Each verb is a boxed closure in a table built once by [`AdapterBuilder`].
//! A verb composes three steps: a parameter transformer, the underlying
//! method, and a response transformer. Calling a verb performs exactly one
//! underlying call.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use futures::FutureExt;
use futures::future::BoxFuture;
use routeadm_api::{BatchDeleteReport, ErrorCode, QueryParams, ResourceId, StandardResult};
use serde_json::Value;

use crate::error::AdapterError;
use crate::service::{BATCH_UNSUPPORTED, StandardService};

/// The verbs of [`StandardService`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    GetList,
    Create,
    Update,
    Delete,
    BatchDelete,
}

impl Verb {
    /// All verbs, in table order
    pub const ALL: [Verb; 5] = [
        Verb::GetList,
        Verb::Create,
        Verb::Update,
        Verb::Delete,
        Verb::BatchDelete,
    ];

    /// Wire name of the verb
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::GetList => "getList",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::BatchDelete => "batchDelete",
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of the dispatch table
pub type BoxedVerb<A, O> = Arc<dyn Fn(A) -> BoxFuture<'static, O> + Send + Sync>;

type ListVerb<T> = BoxedVerb<QueryParams, StandardResult<Vec<T>>>;
type CreateVerb<T> = BoxedVerb<T, StandardResult<T>>;
type UpdateVerb<T> = BoxedVerb<(ResourceId, T), StandardResult<T>>;
type DeleteVerb = BoxedVerb<ResourceId, StandardResult<Value>>;
type BatchVerb = BoxedVerb<Vec<ResourceId>, StandardResult<BatchDeleteReport>>;

/// A backend service exposed through [`StandardService`]
///
/// `batch_delete` is only present when it was mapped; its absence is
/// reported by [`supports_batch_delete`](StandardService::supports_batch_delete).
pub struct ServiceAdapter<T> {
    get_list: ListVerb<T>,
    create: CreateVerb<T>,
    update: UpdateVerb<T>,
    delete: DeleteVerb,
    batch_delete: Option<BatchVerb>,
}

impl<T> Clone for ServiceAdapter<T> {
    fn clone(&self) -> Self {
        Self {
            get_list: self.get_list.clone(),
            create: self.create.clone(),
            update: self.update.clone(),
            delete: self.delete.clone(),
            batch_delete: self.batch_delete.clone(),
        }
    }
}

impl<T> fmt::Debug for ServiceAdapter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAdapter")
            .field("verbs", &self.verbs())
            .finish()
    }
}

impl<T> ServiceAdapter<T> {
    /// Whether the adapter can dispatch `verb`
    #[must_use]
    pub fn supports(&self, verb: Verb) -> bool {
        match verb {
            Verb::BatchDelete => self.batch_delete.is_some(),
            _ => true,
        }
    }

    /// Verbs this adapter dispatches
    #[must_use]
    pub fn verbs(&self) -> Vec<Verb> {
        Verb::ALL
            .into_iter()
            .filter(|verb| self.supports(*verb))
            .collect()
    }
}

#[async_trait]
impl<T: Send + 'static> StandardService<T> for ServiceAdapter<T> {
    async fn get_list(&self, params: QueryParams) -> StandardResult<Vec<T>> {
        tracing::debug!(verb = %Verb::GetList, "adapter dispatch");
        (self.get_list)(params).await
    }

    async fn create(&self, record: T) -> StandardResult<T> {
        tracing::debug!(verb = %Verb::Create, "adapter dispatch");
        (self.create)(record).await
    }

    async fn update(&self, id: ResourceId, record: T) -> StandardResult<T> {
        tracing::debug!(verb = %Verb::Update, %id, "adapter dispatch");
        (self.update)((id, record)).await
    }

    async fn delete(&self, id: ResourceId) -> StandardResult<Value> {
        tracing::debug!(verb = %Verb::Delete, %id, "adapter dispatch");
        (self.delete)(id).await
    }

    fn supports_batch_delete(&self) -> bool {
        self.batch_delete.is_some()
    }

    async fn batch_delete(&self, ids: Vec<ResourceId>) -> StandardResult<BatchDeleteReport> {
        tracing::debug!(verb = %Verb::BatchDelete, ids = ids.len(), "adapter dispatch");
        match &self.batch_delete {
            Some(batch_delete) => batch_delete(ids).await,
            None => StandardResult::failure(ErrorCode::Request, BATCH_UNSUPPORTED),
        }
    }
}

/// Builds a [`ServiceAdapter`] over a service `S`
///
/// # Example
/// ```no_run
/// use std::sync::Arc;
/// use routeadm_api::{QueryParams, StandardResult};
/// use routeadm_api::models::Egress;
/// use routeadm_client::{EgressFilter, EgressPage, EgressService};
/// use routeadm_core::AdapterBuilder;
///
/// # fn example(service: EgressService) -> Result<(), routeadm_core::AdapterError> {
/// let adapter = AdapterBuilder::<_, Egress>::new(Arc::new(service))
///     .get_list_with(
///         |svc: Arc<EgressService>, filter: EgressFilter| async move {
///             svc.get_egress_list(&filter).await
///         },
///         |params: QueryParams| EgressFilter {
///             page_no: params.page().unwrap_or(1),
///             ..Default::default()
///         },
///         |result: StandardResult<EgressPage>| result.map(|page| page.items),
///     )
///     .create(|svc: Arc<EgressService>, egress: Egress| async move {
///         svc.create_egress(&egress).await
///     })
///     .update(|svc: Arc<EgressService>, (id, egress)| async move {
///         svc.update_egress(&id, &egress).await
///     })
///     .delete(|svc: Arc<EgressService>, id| async move { svc.remove_egress(&id).await })
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct AdapterBuilder<S, T> {
    service: Arc<S>,
    get_list: Option<ListVerb<T>>,
    create: Option<CreateVerb<T>>,
    update: Option<UpdateVerb<T>>,
    delete: Option<DeleteVerb>,
    batch_delete: Option<BatchVerb>,
}

impl<S, T> AdapterBuilder<S, T>
where
    S: Send + Sync + 'static,
    T: Send + 'static,
{
    /// Start an adapter with no verbs mapped
    ///
    /// [`build`](Self::build) fails unless the four required verbs get mapped.
    #[must_use]
    pub fn new(service: Arc<S>) -> Self {
        Self {
            service,
            get_list: None,
            create: None,
            update: None,
            delete: None,
            batch_delete: None,
        }
    }

    /// Map `getList` onto a method taking standard params
    #[must_use]
    pub fn get_list<M, Fut>(self, method: M) -> Self
    where
        M: Fn(Arc<S>, QueryParams) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = StandardResult<Vec<T>>> + Send + 'static,
    {
        self.get_list_with(method, identity, identity)
    }

    /// Map `getList` with parameter and response transformers
    #[must_use]
    pub fn get_list_with<M, Fut, P, R, PF, RF>(
        mut self,
        method: M,
        params: PF,
        response: RF,
    ) -> Self
    where
        M: Fn(Arc<S>, P) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        P: 'static,
        R: Send + 'static,
        PF: Fn(QueryParams) -> P + Send + Sync + 'static,
        RF: Fn(R) -> StandardResult<Vec<T>> + Send + Sync + 'static,
    {
        self.get_list = Some(compose(self.service.clone(), method, params, response));
        self
    }

    /// Map `create` onto a method taking the record
    #[must_use]
    pub fn create<M, Fut>(self, method: M) -> Self
    where
        M: Fn(Arc<S>, T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = StandardResult<T>> + Send + 'static,
    {
        self.create_with(method, identity, identity)
    }

    /// Map `create` with parameter and response transformers
    #[must_use]
    pub fn create_with<M, Fut, P, R, PF, RF>(
        mut self,
        method: M,
        params: PF,
        response: RF,
    ) -> Self
    where
        M: Fn(Arc<S>, P) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        P: 'static,
        R: Send + 'static,
        PF: Fn(T) -> P + Send + Sync + 'static,
        RF: Fn(R) -> StandardResult<T> + Send + Sync + 'static,
    {
        self.create = Some(compose(self.service.clone(), method, params, response));
        self
    }

    /// Map `update` onto a method taking `(id, record)`
    #[must_use]
    pub fn update<M, Fut>(self, method: M) -> Self
    where
        M: Fn(Arc<S>, (ResourceId, T)) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = StandardResult<T>> + Send + 'static,
    {
        self.update_with(method, identity, identity)
    }

    /// Map `update` with parameter and response transformers
    #[must_use]
    pub fn update_with<M, Fut, P, R, PF, RF>(
        mut self,
        method: M,
        params: PF,
        response: RF,
    ) -> Self
    where
        M: Fn(Arc<S>, P) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        P: 'static,
        R: Send + 'static,
        PF: Fn((ResourceId, T)) -> P + Send + Sync + 'static,
        RF: Fn(R) -> StandardResult<T> + Send + Sync + 'static,
    {
        self.update = Some(compose(self.service.clone(), method, params, response));
        self
    }

    /// Map `delete` onto a method taking the id
    #[must_use]
    pub fn delete<M, Fut>(self, method: M) -> Self
    where
        M: Fn(Arc<S>, ResourceId) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = StandardResult<Value>> + Send + 'static,
    {
        self.delete_with(method, identity, identity)
    }

    /// Map `delete` with parameter and response transformers
    #[must_use]
    pub fn delete_with<M, Fut, P, R, PF, RF>(
        mut self,
        method: M,
        params: PF,
        response: RF,
    ) -> Self
    where
        M: Fn(Arc<S>, P) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        P: 'static,
        R: Send + 'static,
        PF: Fn(ResourceId) -> P + Send + Sync + 'static,
        RF: Fn(R) -> StandardResult<Value> + Send + Sync + 'static,
    {
        self.delete = Some(compose(self.service.clone(), method, params, response));
        self
    }

    /// Map `batchDelete` onto a method taking the ids
    #[must_use]
    pub fn batch_delete<M, Fut>(self, method: M) -> Self
    where
        M: Fn(Arc<S>, Vec<ResourceId>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = StandardResult<BatchDeleteReport>> + Send + 'static,
    {
        self.batch_delete_with(method, identity, identity)
    }

    /// Map `batchDelete` with parameter and response transformers
    #[must_use]
    pub fn batch_delete_with<M, Fut, P, R, PF, RF>(
        mut self,
        method: M,
        params: PF,
        response: RF,
    ) -> Self
    where
        M: Fn(Arc<S>, P) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        P: 'static,
        R: Send + 'static,
        PF: Fn(Vec<ResourceId>) -> P + Send + Sync + 'static,
        RF: Fn(R) -> StandardResult<BatchDeleteReport> + Send + Sync + 'static,
    {
        self.batch_delete = Some(compose(self.service.clone(), method, params, response));
        self
    }

    /// Finish the dispatch table
    ///
    /// # Errors
    /// Returns [`AdapterError::MissingVerb`] for the first of `getList`,
    /// `create`, `update` or `delete` left unmapped.
    pub fn build(self) -> Result<ServiceAdapter<T>, AdapterError> {
        let adapter = ServiceAdapter {
            get_list: self.get_list.ok_or(AdapterError::MissingVerb(Verb::GetList))?,
            create: self.create.ok_or(AdapterError::MissingVerb(Verb::Create))?,
            update: self.update.ok_or(AdapterError::MissingVerb(Verb::Update))?,
            delete: self.delete.ok_or(AdapterError::MissingVerb(Verb::Delete))?,
            batch_delete: self.batch_delete,
        };
        tracing::debug!(verbs = ?adapter.verbs(), "service adapter built");
        Ok(adapter)
    }
}

impl<S, T> AdapterBuilder<S, T>
where
    S: StandardService<T> + 'static,
    T: Send + 'static,
{
    /// Start an adapter whose unmapped verbs fall back to the service's own
    /// standard methods
    ///
    /// `batchDelete` still has to be mapped explicitly.
    #[must_use]
    pub fn over_standard(service: Arc<S>) -> Self {
        Self::new(service)
            .get_list(|svc: Arc<S>, params| async move { svc.get_list(params).await })
            .create(|svc: Arc<S>, record| async move { svc.create(record).await })
            .update(|svc: Arc<S>, (id, record)| async move { svc.update(id, record).await })
            .delete(|svc: Arc<S>, id| async move { svc.delete(id).await })
    }
}

fn identity<V>(value: V) -> V {
    value
}

fn compose<S, A, P, R, O, M, Fut, PF, RF>(
    service: Arc<S>,
    method: M,
    params: PF,
    response: RF,
) -> BoxedVerb<A, O>
where
    S: Send + Sync + 'static,
    A: 'static,
    O: 'static,
    M: Fn(Arc<S>, P) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    P: 'static,
    R: Send + 'static,
    PF: Fn(A) -> P + Send + Sync + 'static,
    RF: Fn(R) -> O + Send + Sync + 'static,
{
    let response = Arc::new(response);
    Arc::new(move |args: A| {
        let call = method(service.clone(), params(args));
        let response = response.clone();
        async move { response(call.await) }.boxed()
    })
}
