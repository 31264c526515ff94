//! Events driving [`CollectionState`](crate::CollectionState) transitions

use routeadm_api::{Pagination, QueryParams};

use crate::adapter::Verb;
use crate::error::CollectionError;

/// Input to [`CollectionState::dispatch`](crate::CollectionState::dispatch)
#[derive(Debug, Clone, PartialEq)]
pub enum CollectionEvent<T> {
    /// A load was issued
    LoadRequested {
        /// Monotonic id of the load
        request_id: u64,
        /// Requested page
        page: u64,
        /// Requested page size
        page_size: u64,
        /// Filter params for the load
        params: QueryParams,
    },

    /// A load completed successfully
    LoadSucceeded {
        request_id: u64,
        data: Vec<T>,
        /// Total reported by the backend
        total: Option<u64>,
        /// Pagination reported by the backend
        pagination: Option<Pagination>,
    },

    /// A load failed
    LoadFailed {
        request_id: u64,
        error: CollectionError,
    },

    /// A mutation was issued
    MutationRequested { verb: Verb },

    /// A mutation completed successfully
    MutationSucceeded { verb: Verb },

    /// A mutation failed
    MutationFailed { verb: Verb, error: CollectionError },
}

impl<T> CollectionEvent<T> {
    /// Short name for logs
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::LoadRequested { .. } => "LoadRequested",
            Self::LoadSucceeded { .. } => "LoadSucceeded",
            Self::LoadFailed { .. } => "LoadFailed",
            Self::MutationRequested { .. } => "MutationRequested",
            Self::MutationSucceeded { .. } => "MutationSucceeded",
            Self::MutationFailed { .. } => "MutationFailed",
        }
    }
}
