//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check the origin base URL is a usable scheme + host
//! - Check the listener bind address parses
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use url::Url;

use crate::config::schema::ProxyConfig;

/// A single semantic problem found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field (e.g., "origin.base_url").
    pub field: String,
    /// Human-readable description of the problem.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a configuration, collecting every error found.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError {
            field: "listener.bind_address".into(),
            message: format!("not a valid socket address: {}", config.listener.bind_address),
        });
    }

    match Url::parse(&config.origin.base_url) {
        Ok(url) => {
            if url.scheme() != "http" && url.scheme() != "https" {
                errors.push(ValidationError {
                    field: "origin.base_url".into(),
                    message: format!("scheme must be http or https, got {}", url.scheme()),
                });
            }
            if url.host_str().is_none() {
                errors.push(ValidationError {
                    field: "origin.base_url".into(),
                    message: "missing host".into(),
                });
            }
            // Anything after the authority would silently change every
            // rewritten URL, so reject it outright.
            if url.path() != "/" && !url.path().is_empty() {
                errors.push(ValidationError {
                    field: "origin.base_url".into(),
                    message: format!("must be scheme + host only, found path {}", url.path()),
                });
            }
            if url.query().is_some() {
                errors.push(ValidationError {
                    field: "origin.base_url".into(),
                    message: "must be scheme + host only, found query".into(),
                });
            }
        }
        Err(e) => {
            errors.push(ValidationError {
                field: "origin.base_url".into(),
                message: format!("not a valid URL: {}", e),
            });
        }
    }

    if config.origin.client_ip_header.is_empty() {
        errors.push(ValidationError {
            field: "origin.client_ip_header".into(),
            message: "must not be empty".into(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
