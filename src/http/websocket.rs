//! WebSocket upgrade handling.
//!
//! # Responsibilities
//! - Complete the upgrade handshake on `GET /ws`
//! - Resolve the client address and user agent
//! - Hand the connection to the session layer, once
//!
//! # Design Decisions
//! - Origin is not checked; deployment policy decides who may connect
//! - A malformed upgrade request is rejected with axum's rejection response
//!   and logged; nothing is retained
//! - After handoff the server holds no reference to the socket, and the
//!   connection is not part of the shutdown drain

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{
        ws::{rejection::WebSocketUpgradeRejection, WebSocketUpgrade},
        ConnectInfo, State,
    },
    http::{header, HeaderMap},
    response::{IntoResponse, Response},
};

use crate::http::request::RequestIdExt;
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::session::ClientInfo;

pub async fn upgrade(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    upgrade: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> Response {
    let ws = match upgrade {
        Ok(ws) => ws,
        Err(rejection) => {
            tracing::warn!(
                request_id = %headers.request_id(),
                peer = %peer,
                error = %rejection,
                "Error upgrading WebSocket connection"
            );
            metrics::record_upgrade("rejected");
            return rejection.into_response();
        }
    };

    let client = ClientInfo {
        remote_addr: state.proxies.client_ip(peer, &headers).to_string(),
        user_agent: headers
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string(),
    };
    let sessions = Arc::clone(&state.sessions);
    let failed_peer = peer;

    ws.on_failed_upgrade(move |e| {
        tracing::error!(peer = %failed_peer, error = %e, "WebSocket upgrade failed");
        metrics::record_upgrade("failed");
    })
    .on_upgrade(move |socket| async move {
        let remote_addr = client.remote_addr.clone();
        let handle = sessions.create(socket, client);
        metrics::record_upgrade("accepted");
        tracing::info!(session = %handle, remote_addr = %remote_addr, "WebSocket session started");
    })
}
