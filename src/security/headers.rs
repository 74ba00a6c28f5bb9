//! HTTPS enforcement and security response headers.
//!
//! # Responsibilities
//! - Redirect plain-HTTP requests to HTTPS when `force_https` is set
//! - Add strict transport and browser hardening headers
//!
//! # Design Decisions
//! - TLS terminates upstream; `X-Forwarded-Proto: https` marks a secure request
//! - Redirects are 301 and keep host, path and query
//! - Requests without a Host header cannot be redirected and get 400

use axum::{
    body::Body,
    http::{header, HeaderName, HeaderValue, Request, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    Router,
};
use tower_http::set_header::SetResponseHeaderLayer;

pub const X_FORWARDED_PROTO: &str = "x-forwarded-proto";

const HSTS: &str = "max-age=315360000; includeSubDomains";

/// True when the request reached the edge over HTTPS.
pub fn is_secure<B>(req: &Request<B>) -> bool {
    if req.uri().scheme_str() == Some("https") {
        return true;
    }
    req.headers()
        .get(X_FORWARDED_PROTO)
        .and_then(|v| v.to_str().ok())
        .map(|proto| proto.eq_ignore_ascii_case("https"))
        .unwrap_or(false)
}

/// Middleware redirecting insecure requests to their HTTPS equivalent.
pub async fn https_redirect(req: Request<Body>, next: Next) -> Response {
    if is_secure(&req) {
        return next.run(req).await;
    }

    let Some(host) = req.headers().get(header::HOST).and_then(|h| h.to_str().ok()) else {
        return (StatusCode::BAD_REQUEST, "Missing Host header").into_response();
    };
    let path = req
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    let location = format!("https://{host}{path}");

    tracing::debug!(location = %location, "Redirecting to HTTPS");
    match HeaderValue::from_str(&location) {
        Ok(value) => (StatusCode::MOVED_PERMANENTLY, [(header::LOCATION, value)]).into_response(),
        Err(_) => (StatusCode::BAD_REQUEST, "Invalid Host header").into_response(),
    }
}

/// Wrap `router` with the HTTPS redirect and hardening headers.
pub fn apply_force_https<S>(router: Router<S>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router
        .layer(middleware::from_fn(https_redirect))
        .layer(overriding(header::STRICT_TRANSPORT_SECURITY, HSTS))
        .layer(overriding(header::X_FRAME_OPTIONS, "DENY"))
        .layer(overriding(header::X_CONTENT_TYPE_OPTIONS, "nosniff"))
        .layer(overriding(header::X_XSS_PROTECTION, "1; mode=block"))
}

fn overriding(name: HeaderName, value: &'static str) -> SetResponseHeaderLayer<HeaderValue> {
    SetResponseHeaderLayer::overriding(name, HeaderValue::from_static(value))
}
