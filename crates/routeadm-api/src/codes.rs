//! Error code taxonomy carried in `StandardResult::error_code`

use std::convert::Infallible;
use std::str::FromStr;

use thiserror::Error;

/// Wire string for transport and timeout failures
pub const NETWORK_ERROR: &str = "NETWORK_ERROR";
/// Wire string for failures while building a request
pub const REQUEST_ERROR: &str = "REQUEST_ERROR";
/// Wire string for failures that fit no other class
pub const UNKNOWN_ERROR: &str = "UNKNOWN_ERROR";
/// Wire string for HTTP 401 responses
pub const UNAUTHORIZED: &str = "UNAUTHORIZED";

/// Classification of a failed call
///
/// Callers cannot tell a server rejection from a broken transport except
/// through this code.
#[derive(Error, Debug, Clone, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// Transport failure or timeout
    #[error("NETWORK_ERROR")]
    Network,

    /// Request could not be constructed
    #[error("REQUEST_ERROR")]
    Request,

    /// Unexpected failure during the call
    #[error("UNKNOWN_ERROR")]
    Unknown,

    /// HTTP 401, the local session has been torn down
    #[error("UNAUTHORIZED")]
    Unauthorized,

    /// Non-2xx response without a usable body
    #[error("HTTP_{0}")]
    Http(u16),

    /// Business failure reported by the backend
    #[error("{0}")]
    Server(String),
}

impl ErrorCode {
    /// Whether this failure came from the transport rather than the backend
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Network | Self::Request | Self::Unknown)
    }
}

impl FromStr for ErrorCode {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            NETWORK_ERROR => Self::Network,
            REQUEST_ERROR => Self::Request,
            UNKNOWN_ERROR => Self::Unknown,
            UNAUTHORIZED => Self::Unauthorized,
            other => match other.strip_prefix("HTTP_").map(str::parse::<u16>) {
                Some(Ok(status)) => Self::Http(status),
                _ => Self::Server(other.to_string()),
            },
        })
    }
}

impl From<ErrorCode> for String {
    fn from(code: ErrorCode) -> Self {
        code.to_string()
    }
}
