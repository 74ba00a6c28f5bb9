//! Handler for requests no route or static file answered.
//!
//! ```text
//! unmatched request
//!     → /api/*  → 404 {"message":"API endpoint not found"}
//!     → else    → decode path → resolve base href → load shell → rewrite → 200 text/html
//! ```

use std::borrow::Cow;

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode, Uri},
    response::{IntoResponse, Response},
};

use crate::http::api;
use crate::http::request::RequestIdExt;
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::routing::{classify_unmatched, decode_path, resolve_page, Unmatched};
use crate::shell::rewrite;

pub const SHELL_NOT_FOUND: &str = "shell document not found";

pub async fn handle(State(state): State<AppState>, uri: Uri, headers: HeaderMap) -> Response {
    let path = uri.path();

    if classify_unmatched(path) == Unmatched::ApiNotFound {
        tracing::debug!(request_id = %headers.request_id(), path = %path, "Unknown API endpoint");
        return api::not_found();
    }

    let decoded = decode_path(path).unwrap_or(Cow::Borrowed(path));
    let base_href = resolve_page(&decoded, state.pages.as_ref());
    tracing::debug!(
        request_id = %headers.request_id(),
        path = %path,
        base_href = %base_href,
        "Serving shell document"
    );

    let document = &state.config.content.default_document;
    let Some(shell) = state.assets.open(document).await else {
        tracing::error!(document = %document, "Shell document missing from asset store");
        return api::message(StatusCode::INTERNAL_SERVER_ERROR, SHELL_NOT_FOUND);
    };

    let web = &state.config.web;
    let body = rewrite(
        &shell.bytes,
        base_href.as_str(),
        &web.route_url_strategy,
        &web.web_renderer,
        web.use_color_emoji,
    );
    metrics::record_shell_render(!base_href.is_root());

    (StatusCode::OK, [(header::CONTENT_TYPE, "text/html")], body).into_response()
}
