//! Error types for the routeadm client
//!
//! These never reach callers of [`HttpClient`](crate::HttpClient) verbs as
//! `Err`; they are classified into an [`ErrorCode`] and returned as a failed
//! [`StandardResult`].

use std::time::Duration;

use routeadm_api::{ErrorCode, StandardResult};
use thiserror::Error;

/// Failures while performing a request
#[derive(Error, Debug)]
pub enum ClientError {
    /// HTTP transport failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Request body could not be serialized
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Request timed out
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),
}

impl ClientError {
    /// Classify into the wire taxonomy
    #[must_use]
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Http(e) if e.is_builder() => ErrorCode::Request,
            Self::Http(e) if e.is_timeout() || e.is_connect() || e.is_request() || e.is_body() => {
                ErrorCode::Network
            }
            Self::Http(_) => ErrorCode::Unknown,
            Self::Json(_) | Self::Url(_) => ErrorCode::Request,
            Self::Timeout(_) => ErrorCode::Network,
        }
    }

    /// Convert into a failed result
    #[must_use]
    pub fn into_result<T>(self) -> StandardResult<T> {
        let code = self.code();
        StandardResult::failure(code, self.to_string())
    }
}

/// Failures of persistent session storage
#[derive(Error, Debug)]
pub enum StoreError {
    /// Storage file could not be read or written
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Storage file is not valid JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for client setup operations
pub type Result<T> = std::result::Result<T, ClientError>;
