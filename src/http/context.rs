//! Per-request rewrite context.
//!
//! Captures the scheme + host the client actually addressed. Every rewrite
//! stage substitutes these for the origin's scheme + host, so the client
//! only ever sees the proxy's own identity.

use axum::http::header::HOST;
use axum::http::request::Parts;

/// The client-facing scheme and host for one request.
///
/// Immutable once derived; shared by reference with every pipeline stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    /// Inbound scheme, "http" or "https".
    pub scheme: String,
    /// Inbound host, including port when the client addressed one.
    pub host: String,
}

impl RequestContext {
    /// Derive the context from the inbound request head.
    ///
    /// The host comes from the request target's authority (HTTP/2) or the
    /// Host header (HTTP/1.1). The listener itself is plain TCP; a fronting
    /// TLS terminator announces encrypted transport via x-forwarded-proto.
    pub fn from_parts(parts: &Parts) -> Self {
        let host = parts
            .uri
            .authority()
            .map(|a| a.as_str().to_string())
            .or_else(|| {
                parts
                    .headers
                    .get(HOST)
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| "localhost".to_string());

        let scheme = match parts
            .headers
            .get("x-forwarded-proto")
            .and_then(|v| v.to_str().ok())
        {
            Some("https") => "https",
            _ => "http",
        }
        .to_string();

        Self { scheme, host }
    }

    /// Client-facing base URL: scheme + "://" + host.
    pub fn base_url(&self) -> String {
        format!("{}://{}", self.scheme, self.host)
    }

    /// True when the client reached us over encrypted transport.
    pub fn is_secure(&self) -> bool {
        self.scheme == "https"
    }
}
