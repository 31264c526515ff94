//! Resource records managed through the console

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::requests::ResourceId;

/// Outbound proxy rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Egress {
    /// Assigned by the backend on creation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ResourceId>,
    pub name: String,
    /// Upstream address, `host:port`
    pub address: String,
    /// Proxy protocol (`socks5`, `http`, `shadowsocks`, ...)
    #[serde(default = "default_protocol")]
    pub protocol: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remark: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Egress {
    /// Create a new, unsaved egress rule
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            address: address.into(),
            protocol: default_protocol(),
            enabled: true,
            remark: None,
            updated_at: None,
        }
    }

    /// Set protocol
    #[must_use]
    pub fn with_protocol(mut self, protocol: impl Into<String>) -> Self {
        self.protocol = protocol.into();
        self
    }

    /// Set remark
    #[must_use]
    pub fn with_remark(mut self, remark: impl Into<String>) -> Self {
        self.remark = Some(remark.into());
        self
    }
}

fn default_protocol() -> String {
    "socks5".to_string()
}

fn default_enabled() -> bool {
    true
}

/// Routing entry mapping a domain pattern onto an egress rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ResourceId>,
    /// Domain pattern, e.g. `*.example.com`
    pub pattern: String,
    /// Name of the egress rule traffic is sent through
    pub egress: String,
    #[serde(default)]
    pub priority: i32,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

impl Route {
    /// Create a new, unsaved route
    pub fn new(pattern: impl Into<String>, egress: impl Into<String>) -> Self {
        Self {
            id: None,
            pattern: pattern.into(),
            egress: egress.into(),
            priority: 0,
            enabled: true,
        }
    }

    /// Set priority
    #[must_use]
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }
}
