//! API endpoints under `/api/`.
//!
//! The liveness probe is answered here. The OAuth callback and the upload
//! endpoint are handed whole to an [`ApiDelegate`]; this module never reads
//! their bodies.

use async_trait::async_trait;
use axum::{
    extract::{Request, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::http::request::RequestIdExt;
use crate::http::server::AppState;

pub const PONG: &str = "pong";
pub const API_NOT_FOUND: &str = "API endpoint not found";

/// The `{"message": ...}` body used by every built-in API response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiMessage {
    pub message: String,
}

impl ApiMessage {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Build a JSON message response.
pub fn message(status: StatusCode, text: &str) -> Response {
    (status, Json(ApiMessage::new(text))).into_response()
}

/// `404 {"message":"API endpoint not found"}`.
pub fn not_found() -> Response {
    message(StatusCode::NOT_FOUND, API_NOT_FOUND)
}

/// `GET /api/` liveness probe.
pub async fn ping(State(state): State<AppState>) -> Json<ApiMessage> {
    let delay = state.config.api.ping_delay();
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
    Json(ApiMessage::new(PONG))
}

/// Handlers for API routes owned by other components.
#[async_trait]
pub trait ApiDelegate: Send + Sync {
    /// `GET /api/oauth/redirect`.
    async fn oauth_redirect(&self, request: Request) -> Response;

    /// `PUT /api/upload`.
    async fn upload(&self, request: Request) -> Response;
}

/// Delegate used when no OAuth or upload component is plugged in.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableApi;

#[async_trait]
impl ApiDelegate for UnavailableApi {
    async fn oauth_redirect(&self, _request: Request) -> Response {
        message(StatusCode::NOT_IMPLEMENTED, "OAuth is not configured")
    }

    async fn upload(&self, _request: Request) -> Response {
        message(StatusCode::NOT_IMPLEMENTED, "Uploads are not configured")
    }
}

pub async fn oauth_redirect(State(state): State<AppState>, request: Request) -> Response {
    tracing::debug!(request_id = %request.headers().request_id(), "Delegating OAuth callback");
    state.api.oauth_redirect(request).await
}

pub async fn upload(State(state): State<AppState>, request: Request) -> Response {
    tracing::debug!(request_id = %request.headers().request_id(), "Delegating upload");
    state.api.upload(request).await
}
