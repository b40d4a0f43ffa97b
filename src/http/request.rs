//! Request rewriting: inbound client request → outbound origin request.
//!
//! # Responsibilities
//! - Retarget the URL at the configured origin, path + query verbatim
//! - Force Host to the origin host (origin virtual-hosting depends on it)
//! - Populate X-Forwarded-For / X-Forwarded-Proto / X-Forwarded-Host
//! - Defeat the origin's naive CSRF host checks (Origin, Referer)
//! - Pass the body through as a single-use stream, never buffered
//!
//! # Design Decisions
//! - Pure transformation: parts in, fresh outbound request out
//! - A malformed Referer degrades to a synthesized one, never an error
//! - GET/HEAD lose any body the transport attached
//! - Accept-Encoding forced to identity so textual bodies can be rewritten

use axum::body::Body;
use axum::http::header::{HeaderName, HeaderValue, ACCEPT_ENCODING, CONTENT_LENGTH, HOST, ORIGIN, REFERER};
use axum::http::request::Parts;
use axum::http::{HeaderMap, Method, Request};
use tower_http::request_id::{MakeRequestId, RequestId};
use url::Url;
use uuid::Uuid;

use crate::config::schema::OriginConfig;
use crate::error::ProxyError;
use crate::http::context::RequestContext;

pub const X_REQUEST_ID: &str = "x-request-id";

const X_FORWARDED_FOR: HeaderName = HeaderName::from_static("x-forwarded-for");
const X_FORWARDED_PROTO: HeaderName = HeaderName::from_static("x-forwarded-proto");
const X_FORWARDED_HOST: HeaderName = HeaderName::from_static("x-forwarded-host");

/// Generates a UUID v4 request id for the tower-http request-id layer.
#[derive(Clone, Copy, Default)]
pub struct UuidRequestId;

impl MakeRequestId for UuidRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// Connection-scoped headers that must not be forwarded.
pub(crate) fn is_hop_by_hop(name: &HeaderName) -> bool {
    matches!(
        name.as_str(),
        "connection"
            | "keep-alive"
            | "proxy-authenticate"
            | "proxy-authorization"
            | "te"
            | "trailer"
            | "transfer-encoding"
            | "upgrade"
    )
}

/// Build the outbound origin request from the inbound request head and body.
///
/// The body is moved, not copied: for GET/HEAD it is discarded entirely,
/// for every other method it flows through exactly once.
pub fn rewrite_request(
    parts: Parts,
    body: Body,
    ctx: &RequestContext,
    origin: &OriginConfig,
) -> Result<Request<Body>, ProxyError> {
    let path_and_query = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    let target = format!("{}{}", origin.base(), path_and_query);

    let drop_body = parts.method == Method::GET || parts.method == Method::HEAD;

    let mut headers = HeaderMap::with_capacity(parts.headers.len() + 4);
    for (name, value) in parts.headers.iter() {
        if is_hop_by_hop(name) || name == HOST {
            continue;
        }
        if drop_body && name == CONTENT_LENGTH {
            continue;
        }
        headers.append(name.clone(), value.clone());
    }

    headers.insert(HOST, HeaderValue::from_str(origin.host())?);

    let client_ip = parts
        .headers
        .get(origin.client_ip_header.as_str())
        .cloned()
        .unwrap_or_else(|| HeaderValue::from_static("127.0.0.1"));
    headers.insert(X_FORWARDED_FOR, client_ip);
    headers.insert(X_FORWARDED_PROTO, HeaderValue::from_str(&ctx.scheme)?);
    headers.insert(X_FORWARDED_HOST, HeaderValue::from_str(&ctx.host)?);

    // The origin compares Origin/Referer against its own base URL for CSRF.
    if parts.headers.contains_key(ORIGIN) {
        headers.insert(ORIGIN, HeaderValue::from_str(origin.base())?);
    }
    if let Some(referer) = parts.headers.get(REFERER) {
        let rewritten = rewrite_referer(referer.to_str().ok(), origin);
        headers.insert(REFERER, HeaderValue::from_str(&rewritten)?);
    } else if parts.method == Method::POST {
        // The origin requires a Referer on state-changing requests.
        headers.insert(REFERER, HeaderValue::from_str(&format!("{}/", origin.base()))?);
    }

    headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("identity"));

    let mut outbound = Request::builder()
        .method(parts.method)
        .uri(target)
        .body(if drop_body { Body::empty() } else { body })?;
    *outbound.headers_mut() = headers;

    Ok(outbound)
}

/// Retarget a Referer at the origin, keeping the original path + query.
/// An unparseable value falls back to the origin root.
fn rewrite_referer(referer: Option<&str>, origin: &OriginConfig) -> String {
    match referer.and_then(|r| Url::parse(r).ok()) {
        Some(url) => {
            let mut rewritten = format!("{}{}", origin.base(), url.path());
            if let Some(query) = url.query() {
                rewritten.push('?');
                rewritten.push_str(query);
            }
            rewritten
        }
        None => format!("{}/", origin.base()),
    }
}
