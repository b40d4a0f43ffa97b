//! Set-Cookie rewriting.
//!
//! # Responsibilities
//! - Strip Domain so the cookie binds to whichever host the browser used
//! - Strip Secure over plain transport (the browser drops it otherwise)
//! - Normalize SameSite=Strict to Lax (Strict breaks top-level navigation
//!   through the proxy)
//! - Default SameSite=Lax and Path=/ when absent
//!
//! # Design Decisions
//! - Attribute edits are literal/regex substitutions over the raw cookie
//!   string, not a parsed cookie grammar
//! - One rewritten cookie per origin cookie, origin order preserved

use once_cell::sync::Lazy;
use regex::Regex;

use crate::http::context::RequestContext;

static DOMAIN_ATTR: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i);\s*domain=[^;]*").unwrap());
static SECURE_ATTR: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i);\s*secure").unwrap());
static SAMESITE_STRICT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i);\s*samesite=strict").unwrap());
static SAMESITE_ATTR: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i);\s*samesite=").unwrap());
static PATH_ATTR: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i);\s*path=").unwrap());

/// Rewrite one origin Set-Cookie value for the client-facing host.
pub fn rewrite_cookie(cookie: &str, ctx: &RequestContext) -> String {
    let mut cookie = DOMAIN_ATTR.replace_all(cookie, "").into_owned();

    if !ctx.is_secure() {
        cookie = SECURE_ATTR.replace_all(&cookie, "").into_owned();
    }

    if SAMESITE_STRICT.is_match(&cookie) {
        cookie = SAMESITE_STRICT
            .replace_all(&cookie, "; SameSite=Lax")
            .into_owned();
    } else if !SAMESITE_ATTR.is_match(&cookie) {
        cookie.push_str("; SameSite=Lax");
    }

    if !PATH_ATTR.is_match(&cookie) {
        cookie.push_str("; Path=/");
    }

    cookie
}
