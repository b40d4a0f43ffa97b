//! Response body rewriting.
//!
//! # Responsibilities
//! - Decide which content types get textual rewriting (HTML, JSON, CSS, JS)
//! - Replace every literal and escaped form of the origin reference with
//!   the client-facing scheme/host
//!
//! # Design Decisions
//! - Literal substring replacement, not structured parsing; dots in the
//!   origin hostname are literal by construction
//! - Replacements are global and applied in a fixed order (absolute forms
//!   before protocol-relative before quoted/escaped forms)
//! - A body with zero origin references comes back byte-identical

use crate::http::context::RequestContext;

/// Content types whose bodies are rewritten. Everything else streams
/// through untouched.
pub fn is_rewritable_content_type(content_type: &str) -> bool {
    content_type.contains("text/html")
        || content_type.contains("application/json")
        || content_type.contains("text/css")
        || content_type.contains("application/javascript")
        || content_type.contains("text/javascript")
}

/// Replace every occurrence of the origin reference in a textual body.
pub fn rewrite_text(text: &str, origin_host: &str, ctx: &RequestContext) -> String {
    let inbound_base = ctx.base_url();
    let ws_scheme = if ctx.is_secure() { "wss" } else { "ws" };

    // JSON embeds URLs with escaped slashes and (sometimes) escaped dots:
    // https:\/\/forums\.example\.org
    let escaped_origin = format!("https:\\/\\/{}", origin_host.replace('.', "\\."));
    let escaped_inbound = format!("{}:\\/\\/{}", ctx.scheme, ctx.host.replace('.', "\\."));

    text.replace(&format!("https://{}", origin_host), &inbound_base)
        .replace(&format!("http://{}", origin_host), &inbound_base)
        .replace(&format!("//{}", origin_host), &format!("//{}", ctx.host))
        .replace(
            &format!("\"https://{}\"", origin_host),
            &format!("\"{}\"", inbound_base),
        )
        .replace(
            &format!("\"http://{}\"", origin_host),
            &format!("\"{}\"", inbound_base),
        )
        .replace(
            &format!("\"{}\"", origin_host),
            &format!("\"{}\"", ctx.host),
        )
        .replace(&format!("'{}'", origin_host), &format!("'{}'", ctx.host))
        .replace(
            &format!("wss://{}", origin_host),
            &format!("wss://{}", ctx.host),
        )
        .replace(
            &format!("ws://{}", origin_host),
            &format!("{}://{}", ws_scheme, ctx.host),
        )
        .replace(&escaped_origin, &escaped_inbound)
}
