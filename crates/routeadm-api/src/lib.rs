//! routeadm-api: Shared API types
//!
//! Contains the canonical result and pagination types, query parameters,
//! resource records, and the response normalizer used by the client, the
//! core data layer and the CLI.

pub mod codes;
pub mod models;
pub mod normalize;
pub mod requests;
pub mod responses;

pub use codes::ErrorCode;
pub use normalize::{BackendResponse, normalize, normalize_body};
pub use requests::{BatchDeleteRequest, QueryParams, ResourceId};
pub use responses::{
    BatchDeleteReport, BatchFailure, BatchOperationResult, OperationResult, Pagination,
    StandardResult,
};
