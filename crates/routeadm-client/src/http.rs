//! HTTP client for the routeadm backend
//!
//! Every verb returns an already normalized [`StandardResult`]. Transport
//! failures, timeouts and HTTP errors are all reported as data.

use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::header::ACCEPT;
use reqwest::{Client, Method, StatusCode};
use routeadm_api::{ErrorCode, QueryParams, StandardResult, normalize_body};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use crate::config::ClientConfig;
use crate::error::{ClientError, Result, StoreError};
use crate::session::{LogRedirect, SessionGuard, SessionStore, SignInRedirect};

/// HTTP client for communicating with the routeadm backend
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    config: ClientConfig,
    session: Arc<SessionGuard>,
}

impl HttpClient {
    /// Create a new HTTP client that logs on session expiry
    ///
    /// # Example
    /// ```no_run
    /// use std::sync::Arc;
    /// use routeadm_client::{ClientConfig, HttpClient, MemoryStore};
    ///
    /// let config = ClientConfig::new("http://localhost:8080")?;
    /// let client = HttpClient::new(config, Arc::new(MemoryStore::new()));
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    #[must_use]
    pub fn new(config: ClientConfig, store: Arc<dyn SessionStore>) -> Self {
        Self::with_redirect(config, store, Arc::new(LogRedirect))
    }

    /// Create a new HTTP client with a custom sign-in redirect
    #[must_use]
    pub fn with_redirect(
        config: ClientConfig,
        store: Arc<dyn SessionStore>,
        redirect: Arc<dyn SignInRedirect>,
    ) -> Self {
        Self::with_client(config, store, redirect, Client::new())
    }

    /// Create a new HTTP client with custom `reqwest::Client`
    #[must_use]
    pub fn with_client(
        config: ClientConfig,
        store: Arc<dyn SessionStore>,
        redirect: Arc<dyn SignInRedirect>,
        client: Client,
    ) -> Self {
        let session = SessionGuard::new(
            store,
            redirect,
            config.session_policy().clone(),
            config.sign_in_path(),
        );
        Self {
            client,
            config,
            session: Arc::new(session),
        }
    }

    /// Shared configuration handle
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Point this client (and every clone of its configuration) elsewhere
    ///
    /// # Errors
    /// Returns an error if the URL is invalid.
    pub fn update_base_url(&self, base_url: impl AsRef<str>) -> Result<()> {
        self.config.update_base_url(base_url)
    }

    /// Store a bearer credential for subsequent requests
    ///
    /// # Errors
    /// Returns an error if the session store cannot be written.
    pub fn sign_in(&self, token: &str) -> std::result::Result<(), StoreError> {
        self.session.sign_in(token)
    }

    /// Forget the stored session
    ///
    /// # Errors
    /// Returns an error if the session store cannot be written.
    pub fn sign_out(&self) -> std::result::Result<(), StoreError> {
        self.session.sign_out()
    }

    /// Build a full URL from an endpoint and optional query parameters
    fn url(&self, endpoint: &str, params: Option<&QueryParams>) -> Result<Url> {
        let base = self.config.base_url();
        let url = if endpoint.starts_with('/') {
            format!("{base}{endpoint}")
        } else {
            format!("{base}/{endpoint}")
        };
        let mut url = Url::parse(&url)?;

        let pairs = params.map(QueryParams::to_query_pairs).unwrap_or_default();
        if !pairs.is_empty() {
            let mut query = url.query_pairs_mut();
            for (key, value) in &pairs {
                query.append_pair(key, value);
            }
        }
        Ok(url)
    }

    /// Perform a GET request
    pub async fn get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &QueryParams,
    ) -> StandardResult<T> {
        self.execute(Method::GET, endpoint, Some(params), None)
            .await
    }

    /// Perform a POST request with JSON body
    pub async fn post<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &(impl Serialize + ?Sized),
    ) -> StandardResult<T> {
        match serde_json::to_value(body) {
            Ok(body) => {
                self.execute(Method::POST, endpoint, None, Some(body))
                    .await
            }
            Err(e) => ClientError::from(e).into_result(),
        }
    }

    /// Perform a PUT request with JSON body
    pub async fn put<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &(impl Serialize + ?Sized),
    ) -> StandardResult<T> {
        match serde_json::to_value(body) {
            Ok(body) => self.execute(Method::PUT, endpoint, None, Some(body)).await,
            Err(e) => ClientError::from(e).into_result(),
        }
    }

    /// Perform a DELETE request
    pub async fn delete<T: DeserializeOwned>(&self, endpoint: &str) -> StandardResult<T> {
        self.execute(Method::DELETE, endpoint, None, None).await
    }

    /// Run one round trip under the configured timeout
    ///
    /// On expiry the in-flight request future is dropped, which aborts the
    /// transport.
    async fn execute<T: DeserializeOwned>(
        &self,
        method: Method,
        endpoint: &str,
        params: Option<&QueryParams>,
        body: Option<Value>,
    ) -> StandardResult<T> {
        let timeout = self.config.timeout();
        let started = Instant::now();

        let result = match tokio::time::timeout(
            timeout,
            self.round_trip(method.clone(), endpoint, params, body),
        )
        .await
        {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => {
                tracing::warn!(%method, endpoint, error = %e, "request failed");
                e.into_result()
            }
            Err(_) => {
                tracing::warn!(%method, endpoint, timeout_ms = millis(timeout), "request timed out");
                ClientError::Timeout(timeout).into_result()
            }
        };

        tracing::debug!(
            %method,
            endpoint,
            success = result.success,
            error_code = result.error_code.as_deref().unwrap_or("-"),
            elapsed_ms = millis(started.elapsed()),
            "request settled"
        );
        result
    }

    async fn round_trip<T: DeserializeOwned>(
        &self,
        method: Method,
        endpoint: &str,
        params: Option<&QueryParams>,
        body: Option<Value>,
    ) -> Result<StandardResult<T>> {
        let url = self.url(endpoint, params)?;
        let mut request = self
            .client
            .request(method, url)
            .header(ACCEPT, "application/json");

        if !self.config.is_auth_endpoint(endpoint)
            && let Some(token) = self.session.credential()
        {
            request = request.bearer_auth(token);
        }
        if let Some(body) = &body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;
        let reason = status.canonical_reason().unwrap_or("");

        if status == StatusCode::UNAUTHORIZED {
            self.session.teardown();
            let result: StandardResult<T> = normalize_body(status.as_u16(), reason, &text);
            let message = result
                .message
                .filter(|m| !m.is_empty() && !m.starts_with("HTTP "))
                .unwrap_or_else(|| "Session expired, please sign in again".to_string());
            return Ok(StandardResult::failure(ErrorCode::Unauthorized, message));
        }

        let result = normalize_body(status.as_u16(), reason, &text);
        if status.is_success() {
            Ok(result)
        } else {
            tracing::debug!(status = status.as_u16(), "backend returned an error status");
            Ok(result.into_failure(ErrorCode::Http(status.as_u16())))
        }
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::MemoryStore;

    fn client(base: &str) -> HttpClient {
        HttpClient::new(
            ClientConfig::new(base).unwrap(),
            Arc::new(MemoryStore::new()),
        )
    }

    #[test]
    fn test_url_building() {
        let client = client("http://localhost:8080/");
        let url = client.url("/v1/egress", None).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/v1/egress");
    }

    #[test]
    fn test_url_keeps_base_path() {
        let client = client("http://localhost:8080/admin");
        let url = client.url("v1/routes", None).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/admin/v1/routes");
    }

    #[test]
    fn test_url_query_skips_null() {
        let client = client("http://localhost:8080");
        let params = QueryParams::new()
            .with_paging(2, 20)
            .with("search", "hk")
            .with("region", Value::Null);
        let url = client.url("/v1/egress", Some(&params)).unwrap();
        let query = url.query().unwrap();
        assert!(query.contains("page=2"));
        assert!(query.contains("pageSize=20"));
        assert!(query.contains("search=hk"));
        assert!(!query.contains("region"));
    }

    #[test]
    fn test_url_without_params_has_no_query() {
        let client = client("http://localhost:8080");
        let url = client
            .url("/v1/egress", Some(&QueryParams::new()))
            .unwrap();
        assert_eq!(url.query(), None);
    }

    #[test]
    fn test_base_url_update_applies() {
        let client = client("http://localhost:8080");
        client.update_base_url("http://10.0.0.2:9000").unwrap();
        let url = client.url("/v1/egress", None).unwrap();
        assert_eq!(url.as_str(), "http://10.0.0.2:9000/v1/egress");
    }
}
