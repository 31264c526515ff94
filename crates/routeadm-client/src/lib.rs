//! routeadm-client: network layer for the routeadm backend
//!
//! Builds requests, injects the stored bearer credential, enforces a
//! per-request timeout and classifies every failure. Each call returns a
//! normalized [`StandardResult`](routeadm_api::StandardResult) and never an
//! `Err`.
//!
//! # Examples
//!
//! ```no_run
//! use std::sync::Arc;
//! use routeadm_api::models::Route;
//! use routeadm_api::QueryParams;
//! use routeadm_client::{ClientConfig, HttpClient, MemoryStore, RestResource};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ClientConfig::new("http://localhost:8080")?;
//! let client = HttpClient::new(config, Arc::new(MemoryStore::new()));
//!
//! let routes: RestResource<Route> = RestResource::new(client.clone(), "routes");
//! let page = routes.list(&QueryParams::new().with_paging(1, 20)).await;
//! if page.success {
//!     println!("{} routes", page.total.unwrap_or_default());
//! } else {
//!     println!("failed: {:?} {:?}", page.error_code, page.message);
//! }
//!
//! // Repoint every client sharing this configuration
//! client.update_base_url("https://proxy-admin.internal")?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod egress;
pub mod error;
pub mod http;
pub mod resource;
pub mod session;

pub use config::{ClientConfig, DEFAULT_TIMEOUT, SessionPolicy};
pub use egress::{EgressFilter, EgressPage, EgressService};
pub use error::{ClientError, Result, StoreError};
pub use http::HttpClient;
pub use resource::RestResource;
pub use session::{FileStore, LogRedirect, MemoryStore, SessionGuard, SessionStore, SignInRedirect};
