//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the masking proxy.
///
/// Loaded once at startup and shared immutably; the rewrite pipeline never
/// mutates it.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// The single origin being masked.
    pub origin: OriginConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Origin configuration: the one backend every request is forwarded to.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OriginConfig {
    /// Origin base URL, scheme + host only (e.g., "https://forums.example.org").
    /// Single source of truth for every rewrite rule.
    pub base_url: String,

    /// Request header carrying the real client IP, set by a trusted edge.
    /// Used to populate X-Forwarded-For; falls back to 127.0.0.1.
    pub client_ip_header: String,
}

impl Default for OriginConfig {
    fn default() -> Self {
        Self {
            base_url: "https://forums.jtechforums.org".to_string(),
            client_ip_header: "cf-connecting-ip".to_string(),
        }
    }
}

impl OriginConfig {
    /// Origin base URL without a trailing slash.
    pub fn base(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    /// Host (and port, if any) portion of the origin base URL.
    ///
    /// `base_url` is validated at startup, so a missing host only occurs in
    /// hand-built test configs; an empty host matches nothing and is safe.
    pub fn host(&self) -> &str {
        let base = self.base();
        base.find("://")
            .map(|i| &base[i + 3..])
            .unwrap_or(base)
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}
