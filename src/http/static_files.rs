//! Static file middleware.
//!
//! Runs ahead of route dispatch: a `GET`/`HEAD` whose path names a file in
//! the asset store is answered directly. The shell document itself is never
//! served raw; it always goes through the fallback so placeholders are
//! rewritten.

use axum::{
    body::Body,
    extract::{Request, State},
    http::{header, HeaderValue, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::assets::Asset;
use crate::http::server::AppState;
use crate::observability::metrics;

pub async fn serve(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let head = match *request.method() {
        Method::GET => false,
        Method::HEAD => true,
        _ => return next.run(request).await,
    };

    let path = request.uri().path().to_owned();
    if is_shell_document(&path, &state.config.content.default_document) {
        return next.run(request).await;
    }

    let asset = state.assets.open(&path).await;
    match asset {
        Some(asset) => {
            tracing::trace!(path = %path, content_type = asset.content_type, "Static hit");
            metrics::record_static_hit();
            asset_response(asset, head)
        }
        None => next.run(request).await,
    }
}

fn is_shell_document(path: &str, default_document: &str) -> bool {
    path.trim_start_matches('/') == default_document
}

fn asset_response(asset: Asset, head: bool) -> Response {
    let length = HeaderValue::from(asset.bytes.len());
    let body = if head {
        Body::empty()
    } else {
        Body::from(asset.bytes)
    };

    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(asset.content_type)),
            (header::CONTENT_LENGTH, length),
        ],
        body,
    )
        .into_response()
}
