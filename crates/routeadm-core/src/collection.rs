//! `Collection`: client-side state for one paginated resource
//!
//! Loads pages through a [`StandardService`], reloads after every successful
//! mutation and reports outcomes to a [`Notifier`]. Failures never surface as
//! `Err`; they land in state and in notices.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use routeadm_api::{
    BatchOperationResult, OperationResult, QueryParams, ResourceId, StandardResult,
};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::adapter::Verb;
use crate::config::CollectionOptions;
use crate::error::CollectionError;
use crate::message::CollectionEvent;
use crate::notify::{Notice, Notifier};
use crate::service::{BATCH_UNSUPPORTED, StandardService};
use crate::state::CollectionState;

/// Cancellation token guarding state writes
///
/// Once cancelled, every write and notice of the owning collection is a
/// no-op. Clones share the same flag.
#[derive(Debug, Clone, Default)]
pub struct LivenessToken {
    cancelled: Arc<AtomicBool>,
}

impl LivenessToken {
    /// A live token
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the owner as gone
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Whether the owner is still live
    #[must_use]
    pub fn is_alive(&self) -> bool {
        !self.cancelled.load(Ordering::SeqCst)
    }
}

/// Paginated collection backed by a [`StandardService`]
///
/// Verbs take `&self` and may overlap; wrap the collection in an `Arc` to
/// drive it from several tasks.
pub struct Collection<T> {
    service: Arc<dyn StandardService<T>>,
    state: watch::Sender<CollectionState<T>>,
    notifier: Arc<dyn Notifier>,
    liveness: LivenessToken,
    next_request: AtomicU64,
    options: CollectionOptions,
}

impl<T> Collection<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Create an idle collection
    #[must_use]
    pub fn new(
        service: Arc<dyn StandardService<T>>,
        notifier: Arc<dyn Notifier>,
        options: CollectionOptions,
    ) -> Self {
        let initial = CollectionState::new(options.page_size, options.params.clone());
        let (state, _) = watch::channel(initial);
        Self {
            service,
            state,
            notifier,
            liveness: LivenessToken::new(),
            next_request: AtomicU64::new(0),
            options,
        }
    }

    /// Options this collection was created with
    #[must_use]
    pub fn options(&self) -> &CollectionOptions {
        &self.options
    }

    /// Copy of the current state
    #[must_use]
    pub fn snapshot(&self) -> CollectionState<T> {
        self.state.borrow().clone()
    }

    /// Receiver notified on every applied state change
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<CollectionState<T>> {
        self.state.subscribe()
    }

    /// Token shared with this collection's write guard
    #[must_use]
    pub fn liveness(&self) -> LivenessToken {
        self.liveness.clone()
    }

    /// Stop applying results; in-flight calls finish but change nothing
    pub fn teardown(&self) {
        debug!(label = %self.options.label, "collection torn down");
        self.liveness.cancel();
    }

    /// Load the first page if the collection is immediate
    pub async fn mount(&self) {
        if self.options.immediate {
            self.reload().await;
        }
    }

    /// Reload the current page with the current params
    pub async fn reload(&self) {
        self.reload_with(None, None, None).await;
    }

    /// Load a page, overriding any of page, page size or params
    pub async fn reload_with(
        &self,
        page: Option<u64>,
        page_size: Option<u64>,
        params: Option<QueryParams>,
    ) {
        let (page, page_size, params) = {
            let state = self.state.borrow();
            (
                page.unwrap_or(state.pagination.current()).max(1),
                page_size.unwrap_or(state.pagination.page_size()).max(1),
                params.unwrap_or_else(|| state.params.clone()),
            )
        };
        let request_id = self.next_request.fetch_add(1, Ordering::SeqCst) + 1;

        let requested = self.apply(CollectionEvent::LoadRequested {
            request_id,
            page,
            page_size,
            params: params.clone(),
        });
        if !requested {
            return;
        }

        debug!(label = %self.options.label, request_id, page, page_size, "loading page");
        let result = self
            .service
            .get_list(params.with_paging(page, page_size))
            .await;

        if result.success {
            self.apply(CollectionEvent::LoadSucceeded {
                request_id,
                data: result.data.unwrap_or_default(),
                total: result.total,
                pagination: result.pagination,
            });
        } else {
            let error = CollectionError::load(&self.options.label, &result);
            warn!(
                label = %self.options.label,
                request_id,
                error_code = error.code().unwrap_or("-"),
                "load failed"
            );
            if self.apply(CollectionEvent::LoadFailed {
                request_id,
                error: error.clone(),
            }) {
                self.notify(Notice::error(error.to_string()));
            }
        }
    }

    /// Move to another page, optionally changing the page size
    pub async fn handle_page_change(&self, page: u64, page_size: Option<u64>) {
        self.reload_with(Some(page), page_size, None).await;
    }

    /// Replace the params and load the first page
    pub async fn handle_search(&self, params: QueryParams) {
        self.reload_with(Some(1), None, Some(params)).await;
    }

    /// Create a record, reloading on success
    pub async fn create(&self, record: T) -> OperationResult<T> {
        self.mutate(Verb::Create, self.service.create(record)).await
    }

    /// Update a record, reloading on success
    pub async fn update(&self, id: ResourceId, record: T) -> OperationResult<T> {
        self.mutate(Verb::Update, self.service.update(id, record))
            .await
    }

    /// Delete a record, reloading on success
    pub async fn delete(&self, id: ResourceId) -> OperationResult<T> {
        let call = self.service.delete(id);
        self.mutate(Verb::Delete, async move { call.await.discard_data() })
            .await
    }

    /// Delete several records, reloading if any was deleted
    ///
    /// Without a batch endpoint every id is reported failed and no request is
    /// made.
    pub async fn batch_delete(&self, ids: Vec<ResourceId>) -> BatchOperationResult {
        let label = &self.options.label;
        if !self.service.supports_batch_delete() {
            warn!(%label, ids = ids.len(), "batch delete not supported");
            let message = format!("{BATCH_UNSUPPORTED} for {label}");
            self.notify(Notice::error(message.clone()));
            return BatchOperationResult::all_failed(&ids, &message);
        }
        if ids.is_empty() {
            return BatchOperationResult::from_report(&ids, StandardResult::ok_empty());
        }

        self.apply(CollectionEvent::MutationRequested {
            verb: Verb::BatchDelete,
        });
        let result = self.service.batch_delete(ids.clone()).await;
        let error_code = result.error_code.clone();
        let outcome = BatchOperationResult::from_report(&ids, result);
        info!(
            %label,
            succeeded = outcome.success_count,
            failed = outcome.failure_count,
            "batch delete settled"
        );

        if outcome.success {
            self.apply(CollectionEvent::MutationSucceeded {
                verb: Verb::BatchDelete,
            });
            self.notify(Notice::success(format!(
                "Deleted {} {label}(s)",
                outcome.success_count
            )));
        } else {
            let message = match outcome.success_count {
                0 => outcome.failures.first().map_or_else(
                    || format!("Failed to delete {label}(s)"),
                    |f| f.message.clone(),
                ),
                n => format!(
                    "Deleted {n} {label}(s), {} failed",
                    outcome.failure_count
                ),
            };
            self.apply(CollectionEvent::MutationFailed {
                verb: Verb::BatchDelete,
                error: CollectionError::Mutation {
                    verb: Verb::BatchDelete,
                    code: error_code,
                    message: message.clone(),
                },
            });
            self.notify(Notice::error(message));
        }

        if outcome.success_count > 0 {
            self.reload().await;
        }
        outcome
    }

    async fn mutate<F>(&self, verb: Verb, call: F) -> OperationResult<T>
    where
        F: Future<Output = StandardResult<T>>,
    {
        let label = &self.options.label;
        self.apply(CollectionEvent::MutationRequested { verb });
        let result = call.await;

        if result.success {
            let message = result
                .message
                .unwrap_or_else(|| format!("{} {label} succeeded", verb_title(verb)));
            debug!(%verb, %label, "mutation succeeded");
            self.apply(CollectionEvent::MutationSucceeded { verb });
            self.notify(Notice::success(message.clone()));
            self.reload().await;
            OperationResult::succeeded(result.data, message)
        } else {
            let message = result
                .message
                .unwrap_or_else(|| format!("{} {label} failed", verb_title(verb)));
            warn!(
                %verb,
                %label,
                error_code = result.error_code.as_deref().unwrap_or("-"),
                "mutation failed"
            );
            self.apply(CollectionEvent::MutationFailed {
                verb,
                error: CollectionError::Mutation {
                    verb,
                    code: result.error_code,
                    message: message.clone(),
                },
            });
            self.notify(Notice::error(message.clone()));
            OperationResult::failed(message)
        }
    }

    /// Dispatch an event unless the collection was torn down
    fn apply(&self, event: CollectionEvent<T>) -> bool {
        if !self.liveness.is_alive() {
            debug!(event = event.name(), "collection gone, event dropped");
            return false;
        }
        let name = event.name();
        let applied = self.state.send_if_modified(|state| state.dispatch(event));
        if !applied {
            debug!(event = name, "stale event discarded");
        }
        applied
    }

    fn notify(&self, notice: Notice) {
        if self.liveness.is_alive() {
            self.notifier.notify(notice);
        }
    }
}

fn verb_title(verb: Verb) -> &'static str {
    match verb {
        Verb::GetList => "Load",
        Verb::Create => "Create",
        Verb::Update => "Update",
        Verb::Delete => "Delete",
        Verb::BatchDelete => "Batch delete",
    }
}
