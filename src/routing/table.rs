//! Route table and unmatched-request classification.
//!
//! # Responsibilities
//! - Declare every named route (method, path, handler kind) in one place
//! - Decide what an unmatched request is: unknown API call or client route
//!
//! # Design Decisions
//! - The table is static data; `http::server` turns it into an axum router
//! - Path matching is exact and case-sensitive
//! - The `/api/` prefix test is the only discriminator for unmatched paths

use axum::http::Method;

/// Prefix owned by API endpoints.
pub const API_PREFIX: &str = "/api";

/// Path of the WebSocket upgrade endpoint.
pub const UPGRADE_PATH: &str = "/ws";

/// What a table entry dispatches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteKind {
    /// WebSocket handshake and session handoff.
    Upgrade,
    /// Liveness probe.
    Ping,
    /// OAuth callback, delegated.
    OAuthRedirect,
    /// File upload, delegated.
    Upload,
}

impl RouteKind {
    /// Stable label for logs and metrics.
    pub fn as_str(self) -> &'static str {
        match self {
            RouteKind::Upgrade => "upgrade",
            RouteKind::Ping => "ping",
            RouteKind::OAuthRedirect => "oauth_redirect",
            RouteKind::Upload => "upload",
        }
    }
}

/// A single named route.
#[derive(Debug, Clone)]
pub struct RouteEntry {
    pub method: Method,
    pub path: &'static str,
    pub kind: RouteKind,
}

/// Every named route served by the dispatcher.
pub static ROUTES: [RouteEntry; 4] = [
    RouteEntry {
        method: Method::GET,
        path: UPGRADE_PATH,
        kind: RouteKind::Upgrade,
    },
    RouteEntry {
        method: Method::GET,
        path: "/api/",
        kind: RouteKind::Ping,
    },
    RouteEntry {
        method: Method::GET,
        path: "/api/oauth/redirect",
        kind: RouteKind::OAuthRedirect,
    },
    RouteEntry {
        method: Method::PUT,
        path: "/api/upload",
        kind: RouteKind::Upload,
    },
];

/// Outcome for a request no table entry (or static file) answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unmatched {
    /// Under the API prefix: structured 404.
    ApiNotFound,
    /// Anything else: the rewritten shell document.
    Shell,
}

/// True for paths under `/api/`.
pub fn is_api_path(path: &str) -> bool {
    path.strip_prefix(API_PREFIX)
        .map(|rest| rest.starts_with('/'))
        .unwrap_or(false)
}

/// Classify an unmatched request path.
pub fn classify_unmatched(path: &str) -> Unmatched {
    if is_api_path(path) {
        Unmatched::ApiNotFound
    } else {
        Unmatched::Shell
    }
}

/// Look up the table entry for `method` and `path`.
pub fn lookup(method: &Method, path: &str) -> Option<&'static RouteEntry> {
    ROUTES
        .iter()
        .find(|entry| entry.path == path && (entry.method == *method || head_of_get(entry, method)))
}

fn head_of_get(entry: &RouteEntry, method: &Method) -> bool {
    entry.method == Method::GET && *method == Method::HEAD
}
