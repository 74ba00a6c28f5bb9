//! Metrics collection and exposition.
//!
//! # Metrics
//! - `page_server_requests_total` (counter): requests by method, route, status
//! - `page_server_request_duration_seconds` (histogram): latency by route
//! - `page_server_upgrades_total` (counter): upgrade attempts by outcome
//! - `page_server_shell_renders_total` (counter): shell responses by scope
//! - `page_server_static_hits_total` (counter): files served from the asset store
//!
//! Without an installed recorder every call is a no-op.

use std::net::SocketAddr;
use std::time::Instant;

use axum::{body::Body, http::Request, middleware::Next, response::Response};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

use crate::routing::table::{self, is_api_path};

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn record_request(method: &str, status: u16, route: &'static str, start: Instant) {
    metrics::counter!(
        "page_server_requests_total",
        "method" => method.to_string(),
        "route" => route,
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!("page_server_request_duration_seconds", "route" => route)
        .record(start.elapsed().as_secs_f64());
}

/// `outcome` is one of `accepted`, `rejected`, `failed`.
pub fn record_upgrade(outcome: &'static str) {
    metrics::counter!("page_server_upgrades_total", "outcome" => outcome).increment(1);
}

pub fn record_shell_render(page_scoped: bool) {
    let scope = if page_scoped { "page" } else { "root" };
    metrics::counter!("page_server_shell_renders_total", "scope" => scope).increment(1);
}

pub fn record_static_hit() {
    metrics::counter!("page_server_static_hits_total").increment(1);
}

/// Route label for a request, from the route table or the fallback class.
pub fn route_label(method: &axum::http::Method, path: &str) -> &'static str {
    match table::lookup(method, path) {
        Some(entry) => entry.kind.as_str(),
        None if is_api_path(path) => "api_unmatched",
        None => "content",
    }
}

/// Middleware recording count and latency for every request.
pub async fn track_requests(req: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().clone();
    let route = route_label(&method, req.uri().path());

    let response = next.run(req).await;
    record_request(method.as_str(), response.status().as_u16(), route, start);
    response
}
