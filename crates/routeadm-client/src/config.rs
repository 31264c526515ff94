//! Client configuration
//!
//! [`ClientConfig`] is a cheap handle: clones share the same base address, so
//! [`ClientConfig::update_base_url`] takes effect for every client built from
//! it. The remaining settings are fixed at construction.

use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use url::Url;

use crate::error::Result;

/// Default per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(3000);

/// Keys of persisted session state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionPolicy {
    /// Key holding the bearer credential
    pub token_key: String,
    /// Key holding the signed-in user record
    pub user_key: String,
    /// Prefixes of auxiliary entries written by sign-in providers
    pub aux_prefixes: Vec<String>,
}

impl Default for SessionPolicy {
    fn default() -> Self {
        Self {
            token_key: "token".to_string(),
            user_key: "user".to_string(),
            aux_prefixes: vec!["oauth_".to_string(), "oidc_".to_string()],
        }
    }
}

impl SessionPolicy {
    /// Whether `key` belongs to the session
    #[must_use]
    pub fn owns(&self, key: &str) -> bool {
        key == self.token_key
            || key == self.user_key
            || self.aux_prefixes.iter().any(|p| key.starts_with(p.as_str()))
    }
}

/// Network settings shared by every client built from this handle
#[derive(Debug, Clone)]
pub struct ClientConfig {
    base_url: Arc<RwLock<String>>,
    timeout: Duration,
    auth_endpoints: Vec<String>,
    sign_in_path: String,
    session: SessionPolicy,
}

impl ClientConfig {
    /// Create a configuration pointing at `base_url`
    ///
    /// # Errors
    /// Returns an error if the base URL is invalid.
    pub fn new(base_url: impl AsRef<str>) -> Result<Self> {
        let base_url = validate(base_url.as_ref())?;
        Ok(Self {
            base_url: Arc::new(RwLock::new(base_url)),
            timeout: DEFAULT_TIMEOUT,
            auth_endpoints: vec!["/v1/auth/login".to_string(), "/v1/auth/register".to_string()],
            sign_in_path: "/login".to_string(),
            session: SessionPolicy::default(),
        })
    }

    /// Set per-request timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Replace the endpoints that never carry a credential
    #[must_use]
    pub fn with_auth_endpoints<I, S>(mut self, endpoints: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.auth_endpoints = endpoints.into_iter().map(Into::into).collect();
        self
    }

    /// Set the sign-in entry point used after a 401
    #[must_use]
    pub fn with_sign_in_path(mut self, path: impl Into<String>) -> Self {
        self.sign_in_path = path.into();
        self
    }

    /// Set session storage keys
    #[must_use]
    pub fn with_session_policy(mut self, policy: SessionPolicy) -> Self {
        self.session = policy;
        self
    }

    /// Current base address
    #[must_use]
    pub fn base_url(&self) -> String {
        self.base_url
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Point every client sharing this handle at a new address
    ///
    /// # Errors
    /// Returns an error if the URL is invalid; the previous address is kept.
    pub fn update_base_url(&self, base_url: impl AsRef<str>) -> Result<()> {
        let base_url = validate(base_url.as_ref())?;
        tracing::info!(base_url = %base_url, "base URL updated");
        *self
            .base_url
            .write()
            .unwrap_or_else(PoisonError::into_inner) = base_url;
        Ok(())
    }

    /// Per-request timeout
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Sign-in entry point
    #[must_use]
    pub fn sign_in_path(&self) -> &str {
        &self.sign_in_path
    }

    /// Session storage keys
    #[must_use]
    pub fn session_policy(&self) -> &SessionPolicy {
        &self.session
    }

    /// Whether `endpoint` is an authentication endpoint
    #[must_use]
    pub fn is_auth_endpoint(&self, endpoint: &str) -> bool {
        let path = endpoint.split('?').next().unwrap_or(endpoint);
        let path = path.trim_start_matches('/');
        self.auth_endpoints
            .iter()
            .any(|e| path == e.trim_start_matches('/'))
    }
}

fn validate(base_url: &str) -> Result<String> {
    Url::parse(base_url)?;
    Ok(base_url.trim_end_matches('/').to_string())
}
