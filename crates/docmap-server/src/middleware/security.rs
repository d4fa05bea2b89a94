//! Security headers applied to every response.

use axum::http::HeaderValue;
use axum::http::header::HeaderName;
use tower_http::set_header::SetResponseHeaderLayer;

/// Responses are JSON; nothing in them may be framed or executed.
const CONTENT_SECURITY_POLICY: &str = "default-src 'none'; frame-ancestors 'none'";

fn fixed_header(name: &'static str, value: &'static str) -> SetResponseHeaderLayer<HeaderValue> {
    SetResponseHeaderLayer::overriding(
        HeaderName::from_static(name),
        HeaderValue::from_static(value),
    )
}

/// `Content-Security-Policy` forbidding every resource.
pub(crate) fn content_security_policy() -> SetResponseHeaderLayer<HeaderValue> {
    fixed_header("content-security-policy", CONTENT_SECURITY_POLICY)
}

/// `X-Content-Type-Options: nosniff`.
pub(crate) fn no_sniff() -> SetResponseHeaderLayer<HeaderValue> {
    fixed_header("x-content-type-options", "nosniff")
}

/// `X-Frame-Options: DENY`.
pub(crate) fn deny_framing() -> SetResponseHeaderLayer<HeaderValue> {
    fixed_header("x-frame-options", "DENY")
}
