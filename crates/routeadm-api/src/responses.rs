//! Response types for the API

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::codes::ErrorCode;
use crate::requests::ResourceId;

/// Page size used when neither the caller nor the backend supplies one
pub const DEFAULT_PAGE_SIZE: u64 = 10;

/// Pagination metadata
///
/// `total_pages` is always derived from `total` and `page_size`; there is no
/// way to set it directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "PaginationWire")]
pub struct Pagination {
    current: u64,
    page_size: u64,
    total: u64,
    total_pages: u64,
}

impl Pagination {
    /// Build pagination, clamping `current` and `page_size` to at least 1
    #[must_use]
    pub fn new(current: u64, page_size: u64, total: u64) -> Self {
        let page_size = page_size.max(1);
        Self {
            current: current.max(1),
            page_size,
            total,
            total_pages: total.div_ceil(page_size),
        }
    }

    /// 1-based current page
    #[must_use]
    pub fn current(&self) -> u64 {
        self.current
    }

    /// Items per page
    #[must_use]
    pub fn page_size(&self) -> u64 {
        self.page_size
    }

    /// Total number of items across all pages
    #[must_use]
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Number of pages, `ceil(total / page_size)`
    #[must_use]
    pub fn total_pages(&self) -> u64 {
        self.total_pages
    }

    /// Same pagination with a new total
    #[must_use]
    pub fn with_total(self, total: u64) -> Self {
        Self::new(self.current, self.page_size, total)
    }

    /// Same pagination on another page
    #[must_use]
    pub fn with_page(self, current: u64) -> Self {
        Self::new(current, self.page_size, self.total)
    }

    /// Same pagination with another page size
    #[must_use]
    pub fn with_page_size(self, page_size: u64) -> Self {
        Self::new(self.current, page_size, self.total)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(1, DEFAULT_PAGE_SIZE, 0)
    }
}

/// Incoming pagination; `page` is accepted as an alias of `current` and the
/// sender's `totalPages` is ignored in favor of the derived value
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PaginationWire {
    #[serde(default = "first_page", alias = "page")]
    current: u64,
    #[serde(default = "default_page_size")]
    page_size: u64,
    #[serde(default)]
    total: u64,
}

impl From<PaginationWire> for Pagination {
    fn from(wire: PaginationWire) -> Self {
        Self::new(wire.current, wire.page_size, wire.total)
    }
}

fn first_page() -> u64 {
    1
}

fn default_page_size() -> u64 {
    DEFAULT_PAGE_SIZE
}

/// Canonical result of every backend call
///
/// A failed result never carries data. When `pagination` is present,
/// `total` equals `pagination.total()`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StandardResult<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
}

impl<T> StandardResult<T> {
    /// Successful result carrying data
    #[must_use]
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            error_code: None,
            total: None,
            pagination: None,
        }
    }

    /// Successful result without data
    #[must_use]
    pub fn ok_empty() -> Self {
        Self {
            success: true,
            data: None,
            message: None,
            error_code: None,
            total: None,
            pagination: None,
        }
    }

    /// Failed result
    #[must_use]
    pub fn failure(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.into()),
            error_code: Some(code.into()),
            total: None,
            pagination: None,
        }
    }

    /// Replace the message
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Attach pagination and keep `total` in sync with it
    #[must_use]
    pub fn with_pagination(mut self, pagination: Pagination) -> Self {
        self.total = Some(pagination.total());
        self.pagination = Some(pagination);
        self
    }

    /// Set the total, recomputing pagination if present
    #[must_use]
    pub fn with_total(mut self, total: u64) -> Self {
        self.total = Some(total);
        self.pagination = self.pagination.map(|p| p.with_total(total));
        self
    }

    /// Turn this result into a failure, dropping any data
    #[must_use]
    pub fn into_failure(mut self, fallback: ErrorCode) -> Self {
        self.success = false;
        self.data = None;
        if self.error_code.is_none() {
            self.error_code = Some(fallback.into());
        }
        self
    }

    /// Parsed error code, if any
    #[must_use]
    pub fn error_kind(&self) -> Option<ErrorCode> {
        self.error_code.as_deref().and_then(|c| c.parse().ok())
    }

    /// Map the carried data, keeping the metadata
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> StandardResult<U> {
        StandardResult {
            success: self.success,
            data: self.data.map(f),
            message: self.message,
            error_code: self.error_code,
            total: self.total,
            pagination: self.pagination,
        }
    }

    /// Convert the payload type of a result whose data is irrelevant
    #[must_use]
    pub fn discard_data<U>(self) -> StandardResult<U> {
        StandardResult {
            success: self.success,
            data: None,
            message: self.message,
            error_code: self.error_code,
            total: self.total,
            pagination: self.pagination,
        }
    }
}

/// Result of a single create, update or delete
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationResult<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> OperationResult<T> {
    /// Successful operation
    #[must_use]
    pub fn succeeded(data: Option<T>, message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data,
        }
    }

    /// Failed operation
    #[must_use]
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            data: None,
        }
    }
}

/// One id that a batch operation could not process
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchFailure {
    pub id: ResourceId,
    pub message: String,
}

/// Per-item outcome reported by a backend batch endpoint
///
/// Every field is optional: some backends only answer with a status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchDeleteReport {
    #[serde(default)]
    pub success_count: Option<usize>,
    #[serde(default)]
    pub failure_count: Option<usize>,
    #[serde(default)]
    pub failures: Vec<BatchFailure>,
}

/// Outcome of a batch operation
///
/// `success_count + failure_count` always equals the number of submitted ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchOperationResult {
    pub success: bool,
    pub success_count: usize,
    pub failure_count: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<BatchFailure>,
}

impl BatchOperationResult {
    /// Every id failed with the same message
    #[must_use]
    pub fn all_failed(ids: &[ResourceId], message: &str) -> Self {
        Self {
            success: false,
            success_count: 0,
            failure_count: ids.len(),
            failures: ids
                .iter()
                .map(|id| BatchFailure {
                    id: id.clone(),
                    message: message.to_string(),
                })
                .collect(),
        }
    }

    /// Reconcile a backend answer with the submitted ids
    ///
    /// Counts reported by the backend are clamped to `ids.len()` and failures
    /// naming ids that were not submitted are dropped.
    #[must_use]
    pub fn from_report(ids: &[ResourceId], result: StandardResult<BatchDeleteReport>) -> Self {
        let submitted = ids.len();
        if !result.success {
            let message = result
                .message
                .unwrap_or_else(|| "batch delete failed".to_string());
            return Self::all_failed(ids, &message);
        }

        let report = result.data.unwrap_or_default();
        let known: BTreeSet<&ResourceId> = ids.iter().collect();
        let mut seen = BTreeSet::new();
        let failures: Vec<BatchFailure> = report
            .failures
            .into_iter()
            .filter(|f| known.contains(&f.id) && seen.insert(f.id.clone()))
            .collect();

        let success_count = match (report.success_count, report.failure_count) {
            (Some(ok), _) => ok.min(submitted),
            (None, Some(failed)) => submitted.saturating_sub(failed),
            (None, None) => submitted.saturating_sub(failures.len()),
        };
        let failure_count = submitted - success_count;

        Self {
            success: failure_count == 0,
            success_count,
            failure_count,
            failures,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn ids(n: i64) -> Vec<ResourceId> {
        (1..=n).map(ResourceId::from).collect()
    }

    #[test]
    fn test_total_pages_is_ceiling() {
        assert_eq!(Pagination::new(1, 20, 35).total_pages(), 2);
        assert_eq!(Pagination::new(1, 20, 40).total_pages(), 2);
        assert_eq!(Pagination::new(1, 20, 41).total_pages(), 3);
        assert_eq!(Pagination::new(1, 20, 0).total_pages(), 0);
    }

    #[test]
    fn test_pagination_clamps() {
        let p = Pagination::new(0, 0, 5);
        assert_eq!(p.current(), 1);
        assert_eq!(p.page_size(), 1);
        assert_eq!(p.total_pages(), 5);
    }

    #[test]
    fn test_pagination_wire_recomputes() {
        let p: Pagination =
            serde_json::from_value(json!({"page": 2, "pageSize": 20, "total": 35, "totalPages": 9}))
                .unwrap();
        assert_eq!(p.current(), 2);
        assert_eq!(p.total_pages(), 2);

        let out = serde_json::to_value(p).unwrap();
        assert_eq!(
            out,
            json!({"current": 2, "pageSize": 20, "total": 35, "totalPages": 2})
        );
    }

    #[test]
    fn test_with_total_keeps_pagination_in_sync() {
        let result = StandardResult::ok(vec![1, 2])
            .with_pagination(Pagination::new(1, 10, 2))
            .with_total(25);
        assert_eq!(result.total, Some(25));
        assert_eq!(result.pagination.unwrap().total_pages(), 3);
    }

    #[test]
    fn test_into_failure_drops_data() {
        let result = StandardResult::ok("x").into_failure(ErrorCode::Http(500));
        assert!(!result.success);
        assert!(result.data.is_none());
        assert_eq!(result.error_code.as_deref(), Some("HTTP_500"));
    }

    #[test]
    fn test_batch_failure_result() {
        let ids = ids(3);
        let result = BatchOperationResult::from_report(
            &ids,
            StandardResult::failure(ErrorCode::Network, "offline"),
        );
        assert!(!result.success);
        assert_eq!(result.success_count, 0);
        assert_eq!(result.failure_count, 3);
        assert_eq!(result.failures[0].message, "offline");
    }

    #[test]
    fn test_batch_report_without_counts() {
        let ids = ids(4);
        let result = BatchOperationResult::from_report(&ids, StandardResult::ok_empty());
        assert!(result.success);
        assert_eq!(result.success_count, 4);
        assert_eq!(result.failure_count, 0);
    }

    #[test]
    fn test_batch_report_is_clamped() {
        let ids = ids(3);
        let report = BatchDeleteReport {
            success_count: Some(10),
            failure_count: Some(4),
            failures: vec![],
        };
        let result = BatchOperationResult::from_report(&ids, StandardResult::ok(report));
        assert_eq!(result.success_count + result.failure_count, 3);
        assert_eq!(result.success_count, 3);
    }

    #[test]
    fn test_batch_report_partial_failure() {
        let ids = ids(3);
        let report = BatchDeleteReport {
            success_count: None,
            failure_count: None,
            failures: vec![
                BatchFailure {
                    id: ResourceId::from(2_i64),
                    message: "in use".into(),
                },
                BatchFailure {
                    id: ResourceId::from(99_i64),
                    message: "unknown".into(),
                },
            ],
        };
        let result = BatchOperationResult::from_report(&ids, StandardResult::ok(report));
        assert!(!result.success);
        assert_eq!(result.success_count, 2);
        assert_eq!(result.failure_count, 1);
        assert_eq!(result.failures.len(), 1);
    }

    #[test]
    fn test_batch_counts_always_sum_to_ids() {
        for n in 0..6 {
            let ids = ids(n);
            for reported in 0..8 {
                let report = BatchDeleteReport {
                    success_count: Some(reported),
                    ..Default::default()
                };
                let result = BatchOperationResult::from_report(&ids, StandardResult::ok(report));
                assert_eq!(result.success_count + result.failure_count, ids.len());
            }
        }
    }
}
