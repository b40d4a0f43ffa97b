//! Proxy error taxonomy.
//!
//! One enum covers every way the pipeline can fail. A malformed Referer is
//! not represented here: the request rewriter recovers it locally with a
//! synthesized value and the request proceeds.

use thiserror::Error;

/// Errors that can occur while proxying a single request.
///
/// Every variant surfaces to the client as the same uniform diagnostic
/// response (500, text/plain, permissive CORS); requests are isolated, so
/// no variant is fatal to the process.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// The outbound call to the origin failed (connect, TLS, or transport).
    /// Not retried: one pass-through attempt per client request.
    #[error("origin unavailable: {0}")]
    OriginUnavailable(#[from] hyper_util::client::legacy::Error),

    /// A rewritten request or response could not be constructed.
    #[error("failed to build rewritten message: {0}")]
    MessageBuild(#[from] axum::http::Error),

    /// A rewritten header value was not a legal HTTP header value.
    #[error("rewritten header is not a valid header value: {0}")]
    HeaderValue(#[from] axum::http::header::InvalidHeaderValue),

    /// A header that must be rewritten carried non-ASCII or opaque bytes.
    #[error("header is not valid visible ASCII: {0}")]
    HeaderNotText(#[from] axum::http::header::ToStrError),

    /// Reading the origin response body failed mid-stream.
    #[error("failed to read origin response body: {0}")]
    BodyRead(#[from] axum::Error),
}

/// Render the error and its source chain for the diagnostic response body.
///
/// Rust has no exception stack trace; the chain of `source()` causes is the
/// closest equivalent and names the failing transport layer precisely.
pub fn error_chain(err: &dyn std::error::Error) -> String {
    let mut out = format!("{}", err);
    let mut source = err.source();
    while let Some(cause) = source {
        out.push_str("\ncaused by: ");
        out.push_str(&cause.to_string());
        source = cause.source();
    }
    out
}
