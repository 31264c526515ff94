//! Core error types for routeadm-core

use routeadm_api::StandardResult;
use thiserror::Error;

use crate::adapter::Verb;

/// Failure recorded in collection state
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CollectionError {
    /// Loading a page failed
    #[error("failed to load {label}: {message}")]
    Load {
        /// Resource label
        label: String,
        /// Wire error code, when the backend or transport reported one
        code: Option<String>,
        /// Human readable message
        message: String,
    },

    /// A create, update, delete or batch delete failed
    #[error("{verb} failed: {message}")]
    Mutation {
        /// Verb that failed
        verb: Verb,
        /// Wire error code, when reported
        code: Option<String>,
        /// Human readable message
        message: String,
    },
}

impl CollectionError {
    /// Build a load error from a failed result
    #[must_use]
    pub fn load<T>(label: &str, result: &StandardResult<T>) -> Self {
        Self::Load {
            label: label.to_string(),
            code: result.error_code.clone(),
            message: result
                .message
                .clone()
                .unwrap_or_else(|| "request failed".to_string()),
        }
    }

    /// Wire error code, if any
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Load { code, .. } | Self::Mutation { code, .. } => code.as_deref(),
        }
    }

    /// Human readable message without the prefix
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Load { message, .. } | Self::Mutation { message, .. } => message,
        }
    }
}

/// Malformed adapter configuration
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdapterError {
    /// A required verb has no method mapped onto it
    #[error("no method mapped for verb {0}")]
    MissingVerb(Verb),
}

#[cfg(test)]
mod tests {
    use routeadm_api::ErrorCode;

    use super::*;

    #[test]
    fn test_load_error_from_result() {
        let result: StandardResult<()> = StandardResult::failure(ErrorCode::Network, "timed out");
        let error = CollectionError::load("routes", &result);
        assert_eq!(error.code(), Some("NETWORK_ERROR"));
        assert_eq!(error.message(), "timed out");
        assert_eq!(error.to_string(), "failed to load routes: timed out");
    }

    #[test]
    fn test_adapter_error_names_verb() {
        let error = AdapterError::MissingVerb(Verb::Update);
        assert_eq!(error.to_string(), "no method mapped for verb update");
    }
}
