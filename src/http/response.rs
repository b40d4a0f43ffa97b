//! Response header rewriting: origin response → client-facing headers.
//!
//! # Responsibilities
//! - Retarget Location at the client-facing scheme/host
//! - Rewrite the origin hostname out of Content-Security-Policy
//! - Drop Strict-Transport-Security over plain transport
//! - Reflect the exact client origin in CORS headers (credentials allowed)
//! - Extract every Set-Cookie for per-cookie rewriting
//!
//! # Design Decisions
//! - The header map is rebuilt, never mutated in place, so stale Set-Cookie
//!   entries cannot leak into the final response
//! - Cookies come back as a separate ordered list; the dispatcher appends
//!   them one header line per cookie

use axum::http::header::{
    HeaderValue, ACCESS_CONTROL_ALLOW_CREDENTIALS, ACCESS_CONTROL_ALLOW_HEADERS,
    ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN, CONTENT_SECURITY_POLICY, LOCATION,
    SET_COOKIE, STRICT_TRANSPORT_SECURITY,
};
use axum::http::HeaderMap;

use crate::config::schema::OriginConfig;
use crate::error::ProxyError;
use crate::http::context::RequestContext;
use crate::http::cookies::rewrite_cookie;
use crate::http::request::is_hop_by_hop;

const ALLOWED_METHODS: &str = "GET, POST, PUT, DELETE, OPTIONS, PATCH";
const ALLOWED_HEADERS: &str = "Content-Type, Authorization, X-Requested-With, \
                               Discourse-Present, X-CSRF-Token, Discourse-Logged-In, \
                               Discourse-Visible";

/// Rebuild the origin response headers for the client, returning the new
/// header map and the rewritten cookies in origin order.
pub fn rewrite_headers(
    origin_headers: &HeaderMap,
    ctx: &RequestContext,
    origin: &OriginConfig,
) -> Result<(HeaderMap, Vec<String>), ProxyError> {
    let mut headers = HeaderMap::with_capacity(origin_headers.len() + 4);
    let mut cookies = Vec::new();

    for (name, value) in origin_headers.iter() {
        if is_hop_by_hop(name) {
            continue;
        }
        if name == SET_COOKIE {
            cookies.push(rewrite_cookie(value.to_str()?, ctx));
            continue;
        }
        if name == LOCATION {
            // Full base URL first, then bare hostname (covers the //host
            // protocol-relative form) to avoid double-rewriting.
            let rewritten = value
                .to_str()?
                .replace(origin.base(), &ctx.base_url())
                .replace(origin.host(), &ctx.host);
            headers.insert(LOCATION, HeaderValue::from_str(&rewritten)?);
            continue;
        }
        if name == CONTENT_SECURITY_POLICY {
            let rewritten = value.to_str()?.replace(origin.host(), &ctx.host);
            headers.append(CONTENT_SECURITY_POLICY, HeaderValue::from_str(&rewritten)?);
            continue;
        }
        if name == STRICT_TRANSPORT_SECURITY && !ctx.is_secure() {
            // A stale HSTS directive would block the plain-transport case.
            continue;
        }
        headers.append(name.clone(), value.clone());
    }

    // Credentials are allowed, so the exact client origin is reflected
    // rather than "*".
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_str(&ctx.base_url())?);
    headers.insert(ACCESS_CONTROL_ALLOW_CREDENTIALS, HeaderValue::from_static("true"));
    headers.insert(ACCESS_CONTROL_ALLOW_METHODS, HeaderValue::from_static(ALLOWED_METHODS));
    headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static(ALLOWED_HEADERS));

    Ok((headers, cookies))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn origin() -> OriginConfig {
        OriginConfig {
            base_url: "https://forums.jtechforums.org".to_string(),
            client_ip_header: "cf-connecting-ip".to_string(),
        }
    }

    fn secure_ctx() -> RequestContext {
        RequestContext {
            scheme: "https".to_string(),
            host: "example.com".to_string(),
        }
    }

    fn plain_ctx() -> RequestContext {
        RequestContext {
            scheme: "http".to_string(),
            host: "example.com".to_string(),
        }
    }

    #[test]
    fn test_location_round_trip() {
        let mut origin_headers = HeaderMap::new();
        origin_headers.insert(
            LOCATION,
            HeaderValue::from_static("https://forums.jtechforums.org/t/42"),
        );
        let (headers, _) = rewrite_headers(&origin_headers, &secure_ctx(), &origin()).unwrap();
        assert_eq!(headers[LOCATION.as_str()], "https://example.com/t/42");
    }

    #[test]
    fn test_location_protocol_relative() {
        let mut origin_headers = HeaderMap::new();
        origin_headers.insert(
            LOCATION,
            HeaderValue::from_static("//forums.jtechforums.org/login"),
        );
        let (headers, _) = rewrite_headers(&origin_headers, &secure_ctx(), &origin()).unwrap();
        assert_eq!(headers[LOCATION.as_str()], "//example.com/login");
    }

    #[test]
    fn test_csp_hostname_rewritten_globally() {
        let mut origin_headers = HeaderMap::new();
        origin_headers.insert(
            CONTENT_SECURITY_POLICY,
            HeaderValue::from_static(
                "script-src forums.jtechforums.org; connect-src wss://forums.jtechforums.org",
            ),
        );
        let (headers, _) = rewrite_headers(&origin_headers, &secure_ctx(), &origin()).unwrap();
        assert_eq!(
            headers[CONTENT_SECURITY_POLICY.as_str()],
            "script-src example.com; connect-src wss://example.com"
        );
    }

    #[test]
    fn test_hsts_dropped_over_plain_kept_over_https() {
        let mut origin_headers = HeaderMap::new();
        origin_headers.insert(
            STRICT_TRANSPORT_SECURITY,
            HeaderValue::from_static("max-age=31536000"),
        );

        let (plain, _) = rewrite_headers(&origin_headers, &plain_ctx(), &origin()).unwrap();
        assert!(!plain.contains_key(STRICT_TRANSPORT_SECURITY));

        let (secure, _) = rewrite_headers(&origin_headers, &secure_ctx(), &origin()).unwrap();
        assert_eq!(secure[STRICT_TRANSPORT_SECURITY.as_str()], "max-age=31536000");
    }

    #[test]
    fn test_cors_headers_reflect_exact_origin() {
        let (headers, _) = rewrite_headers(&HeaderMap::new(), &secure_ctx(), &origin()).unwrap();
        assert_eq!(headers[ACCESS_CONTROL_ALLOW_ORIGIN.as_str()], "https://example.com");
        assert_eq!(headers[ACCESS_CONTROL_ALLOW_CREDENTIALS.as_str()], "true");
        assert_eq!(
            headers[ACCESS_CONTROL_ALLOW_METHODS.as_str()],
            "GET, POST, PUT, DELETE, OPTIONS, PATCH"
        );
        assert!(headers[ACCESS_CONTROL_ALLOW_HEADERS.as_str()]
            .to_str()
            .unwrap()
            .contains("X-CSRF-Token"));
    }

    #[test]
    fn test_set_cookie_extracted_one_to_one_in_order() {
        let mut origin_headers = HeaderMap::new();
        origin_headers.append(SET_COOKIE, HeaderValue::from_static("first=1"));
        origin_headers.append(
            SET_COOKIE,
            HeaderValue::from_static("second=2; Domain=forums.jtechforums.org"),
        );
        origin_headers.append(SET_COOKIE, HeaderValue::from_static("third=3; Path=/t"));

        let (headers, cookies) = rewrite_headers(&origin_headers, &secure_ctx(), &origin()).unwrap();
        assert!(!headers.contains_key(SET_COOKIE));
        assert_eq!(
            cookies,
            vec![
                "first=1; SameSite=Lax; Path=/".to_string(),
                "second=2; SameSite=Lax; Path=/".to_string(),
                "third=3; Path=/t; SameSite=Lax".to_string(),
            ]
        );
    }

    #[test]
    fn test_hop_by_hop_and_unrelated_headers() {
        let mut origin_headers = HeaderMap::new();
        origin_headers.insert("transfer-encoding", HeaderValue::from_static("chunked"));
        origin_headers.insert("x-discourse-route", HeaderValue::from_static("topics/show"));
        let (headers, _) = rewrite_headers(&origin_headers, &secure_ctx(), &origin()).unwrap();
        assert!(!headers.contains_key("transfer-encoding"));
        assert_eq!(headers["x-discourse-route"], "topics/show");
    }
}
