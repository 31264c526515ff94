//! Collection state machine

use routeadm_api::{Pagination, QueryParams};

use crate::error::CollectionError;
use crate::message::CollectionEvent;

/// State owned by one [`Collection`](crate::Collection)
///
/// Only [`dispatch`](Self::dispatch) changes it.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionState<T> {
    /// Records of the current page
    pub data: Vec<T>,
    /// A load is in flight
    pub loading: bool,
    /// Last failure, cleared by the next successful load
    pub error: Option<CollectionError>,
    pub pagination: Pagination,
    /// Filters applied to every load
    pub params: QueryParams,
    pending_mutations: usize,
    latest_request: u64,
}

impl<T> CollectionState<T> {
    /// Idle state before the first load
    #[must_use]
    pub fn new(page_size: u64, params: QueryParams) -> Self {
        Self {
            data: Vec::new(),
            loading: false,
            error: None,
            pagination: Pagination::new(1, page_size, 0),
            params,
            pending_mutations: 0,
            latest_request: 0,
        }
    }

    /// Whether a create, update or delete is in flight
    #[must_use]
    pub fn mutating(&self) -> bool {
        self.pending_mutations > 0
    }

    /// Id of the most recently issued load
    #[must_use]
    pub fn latest_request(&self) -> u64 {
        self.latest_request
    }

    /// Apply an event
    ///
    /// Returns `false` when the event was discarded. Load events are
    /// discarded unless they carry the latest issued request id, so a slow
    /// response can never overwrite a newer one.
    pub fn dispatch(&mut self, event: CollectionEvent<T>) -> bool {
        match event {
            CollectionEvent::LoadRequested {
                request_id,
                page,
                page_size,
                params,
            } => {
                if request_id <= self.latest_request {
                    return false;
                }
                self.latest_request = request_id;
                self.loading = true;
                self.pagination = self.pagination.with_page(page).with_page_size(page_size);
                self.params = params;
            }
            CollectionEvent::LoadSucceeded {
                request_id,
                data,
                total,
                pagination,
            } => {
                if request_id != self.latest_request {
                    return false;
                }
                let total = total
                    .or(pagination.map(|p| p.total()))
                    .unwrap_or(data.len() as u64);
                self.pagination = match pagination {
                    Some(p) => p.with_total(total),
                    None => self.pagination.with_total(total),
                };
                self.data = data;
                self.loading = false;
                self.error = None;
            }
            CollectionEvent::LoadFailed { request_id, error } => {
                if request_id != self.latest_request {
                    return false;
                }
                self.loading = false;
                self.error = Some(error);
            }
            CollectionEvent::MutationRequested { .. } => {
                self.pending_mutations += 1;
            }
            CollectionEvent::MutationSucceeded { .. } => {
                self.pending_mutations = self.pending_mutations.saturating_sub(1);
            }
            CollectionEvent::MutationFailed { error, .. } => {
                self.pending_mutations = self.pending_mutations.saturating_sub(1);
                self.error = Some(error);
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::Verb;

    fn requested(request_id: u64, page: u64) -> CollectionEvent<u32> {
        CollectionEvent::LoadRequested {
            request_id,
            page,
            page_size: 20,
            params: QueryParams::new(),
        }
    }

    fn succeeded(request_id: u64, data: Vec<u32>, total: u64) -> CollectionEvent<u32> {
        CollectionEvent::LoadSucceeded {
            request_id,
            data,
            total: Some(total),
            pagination: None,
        }
    }

    fn load_error() -> CollectionError {
        CollectionError::Load {
            label: "route".into(),
            code: Some("NETWORK_ERROR".into()),
            message: "down".into(),
        }
    }

    #[test]
    fn test_load_cycle() {
        let mut state = CollectionState::new(10, QueryParams::new());
        assert!(state.dispatch(requested(1, 2)));
        assert!(state.loading);
        assert_eq!(state.pagination.current(), 2);
        assert_eq!(state.pagination.page_size(), 20);

        assert!(state.dispatch(succeeded(1, (0..15).collect(), 35)));
        assert!(!state.loading);
        assert_eq!(state.data.len(), 15);
        assert_eq!(state.pagination.current(), 2);
        assert_eq!(state.pagination.total_pages(), 2);
    }

    #[test]
    fn test_stale_result_is_discarded() {
        let mut state = CollectionState::new(10, QueryParams::new());
        state.dispatch(requested(1, 1));
        state.dispatch(requested(2, 2));

        assert!(state.dispatch(succeeded(2, vec![2], 1)));
        assert!(!state.dispatch(succeeded(1, vec![1], 1)));
        assert_eq!(state.data, vec![2]);
        assert!(!state.loading);
    }

    #[test]
    fn test_stale_request_is_discarded() {
        let mut state: CollectionState<u32> = CollectionState::new(10, QueryParams::new());
        state.dispatch(requested(2, 5));
        assert!(!state.dispatch(requested(1, 1)));
        assert_eq!(state.pagination.current(), 5);
    }

    #[test]
    fn test_failure_keeps_data() {
        let mut state = CollectionState::new(10, QueryParams::new());
        state.dispatch(requested(1, 1));
        state.dispatch(succeeded(1, vec![1, 2, 3], 3));
        state.dispatch(requested(2, 1));

        assert!(state.dispatch(CollectionEvent::LoadFailed {
            request_id: 2,
            error: load_error(),
        }));
        assert_eq!(state.data, vec![1, 2, 3]);
        assert_eq!(state.error, Some(load_error()));
        assert!(!state.loading);

        state.dispatch(requested(3, 1));
        state.dispatch(succeeded(3, vec![4], 1));
        assert_eq!(state.error, None);
    }

    #[test]
    fn test_backend_pagination_wins() {
        let mut state = CollectionState::new(10, QueryParams::new());
        state.dispatch(requested(1, 1));
        state.dispatch(CollectionEvent::LoadSucceeded {
            request_id: 1,
            data: vec![1],
            total: None,
            pagination: Some(Pagination::new(3, 25, 80)),
        });
        assert_eq!(state.pagination.current(), 3);
        assert_eq!(state.pagination.page_size(), 25);
        assert_eq!(state.pagination.total_pages(), 4);
    }

    #[test]
    fn test_mutation_tracking() {
        let mut state: CollectionState<u32> = CollectionState::new(10, QueryParams::new());
        state.dispatch(CollectionEvent::MutationRequested { verb: Verb::Create });
        assert!(state.mutating());
        state.dispatch(CollectionEvent::MutationSucceeded { verb: Verb::Create });
        assert!(!state.mutating());
    }
}
