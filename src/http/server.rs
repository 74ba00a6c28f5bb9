//! HTTP server setup and lifecycle.
//!
//! # Responsibilities
//! - Create the axum Router from the route table
//! - Wire up middleware (tracing, request ID, HTTPS policy, timeout,
//!   metrics, static files)
//! - Bind with bounded retry and serve
//! - Drain in-flight requests on shutdown, bounded by the drain timeout
//! - Run the background task runner for the server's lifetime

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    middleware,
    routing::{on, MethodFilter, MethodRouter},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::watch;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::assets::{AssetStore, LayeredAssetStore};
use crate::config::ServerConfig;
use crate::http::connections::ConnectionSet;
use crate::http::request::{propagate_request_id_layer, set_request_id_layer};
use crate::http::{api, fallback, static_files, websocket};
use crate::lifecycle::{
    startup, BackgroundTasks, IdleBackgroundTasks, LifecycleError, LifecycleState, RetryPolicy,
    ShutdownSignal, StateTracker,
};
use crate::observability::metrics;
use crate::pages::{InMemoryPageRegistry, PageRegistry};
use crate::routing::table::{RouteEntry, RouteKind, ROUTES};
use crate::security::headers::apply_force_https;
use crate::security::TrustedProxies;
use crate::session::{IdleSessionFactory, SessionFactory};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub pages: Arc<dyn PageRegistry>,
    pub assets: Arc<dyn AssetStore>,
    pub sessions: Arc<dyn SessionFactory>,
    pub api: Arc<dyn api::ApiDelegate>,
    pub proxies: Arc<TrustedProxies>,
}

/// External components the server talks to.
#[derive(Clone)]
pub struct Collaborators {
    pub pages: Arc<dyn PageRegistry>,
    pub assets: Arc<dyn AssetStore>,
    pub sessions: Arc<dyn SessionFactory>,
    pub api: Arc<dyn api::ApiDelegate>,
    pub background: Arc<dyn BackgroundTasks>,
}

impl Collaborators {
    /// Built-in implementations: pages from `config.pages`, layered
    /// directory assets, idle sessions, unavailable delegated APIs.
    pub fn from_config(config: &ServerConfig) -> Self {
        Self {
            pages: Arc::new(InMemoryPageRegistry::from_names(config.pages.iter().cloned())),
            assets: Arc::new(LayeredAssetStore::from_config(&config.content)),
            sessions: Arc::new(IdleSessionFactory),
            api: Arc::new(api::UnavailableApi),
            background: Arc::new(IdleBackgroundTasks),
        }
    }

    pub fn with_pages(mut self, pages: Arc<dyn PageRegistry>) -> Self {
        self.pages = pages;
        self
    }

    pub fn with_assets(mut self, assets: Arc<dyn AssetStore>) -> Self {
        self.assets = assets;
        self
    }

    pub fn with_sessions(mut self, sessions: Arc<dyn SessionFactory>) -> Self {
        self.sessions = sessions;
        self
    }

    pub fn with_api(mut self, api: Arc<dyn api::ApiDelegate>) -> Self {
        self.api = api;
        self
    }

    pub fn with_background(mut self, background: Arc<dyn BackgroundTasks>) -> Self {
        self.background = background;
        self
    }
}

/// Pause after a failed `accept` (for example when out of file descriptors).
const ACCEPT_ERROR_BACKOFF: Duration = Duration::from_millis(100);

/// Why a single serve attempt ended.
enum ServeError {
    /// Bind failure; retryable.
    Io(std::io::Error),
    /// Drain deadline exceeded.
    Forced,
}

/// HTTP server for the page shell, static assets and session upgrades.
pub struct HttpServer {
    router: Router,
    config: Arc<ServerConfig>,
    background: Arc<dyn BackgroundTasks>,
    state: StateTracker,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ServerConfig, collaborators: Collaborators) -> Self {
        let config = Arc::new(config);
        let state = AppState {
            config: Arc::clone(&config),
            pages: collaborators.pages,
            assets: collaborators.assets,
            sessions: collaborators.sessions,
            api: collaborators.api,
            proxies: Arc::new(TrustedProxies::from_config(&config.proxy.trusted_proxies)),
        };

        let router = build_router(&config, state);
        Self {
            router,
            config,
            background: collaborators.background,
            state: StateTracker::new(),
        }
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// The assembled router, for driving requests without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Observe lifecycle transitions.
    pub fn state(&self) -> watch::Receiver<LifecycleState> {
        self.state.subscribe()
    }

    /// Bind, serve until `shutdown` fires, then drain.
    ///
    /// Returns `Ok(())` on a clean stop. Bind exhaustion and drain timeout
    /// are returned as distinct [`LifecycleError`] variants.
    pub async fn run(self, shutdown: ShutdownSignal) -> Result<(), LifecycleError> {
        let addr = startup::resolve_bind_addr(&self.config.listener)?;
        let policy = RetryPolicy::from_config(&self.config.lifecycle);
        let drain_timeout = self.config.lifecycle.drain_timeout();

        let background = {
            let tasks = Arc::clone(&self.background);
            let signal = shutdown.clone();
            tokio::spawn(async move { tasks.run(signal).await })
        };

        let result = self
            .serve_with_retry(addr, policy, drain_timeout, shutdown)
            .await;
        self.state.set(LifecycleState::Stopped);

        match &result {
            Ok(()) => {
                if tokio::time::timeout(drain_timeout, background).await.is_err() {
                    tracing::warn!("Background tasks still running after drain timeout");
                }
                tracing::info!("Server exited");
            }
            Err(e) => {
                background.abort();
                tracing::error!(error = %e, "Server stopped with error");
            }
        }
        result
    }

    async fn serve_with_retry(
        &self,
        addr: SocketAddr,
        policy: RetryPolicy,
        drain_timeout: Duration,
        shutdown: ShutdownSignal,
    ) -> Result<(), LifecycleError> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.serve_once(addr, drain_timeout, shutdown.clone()).await {
                Ok(()) => return Ok(()),
                Err(ServeError::Forced) => {
                    return Err(LifecycleError::ForcedShutdown {
                        timeout: drain_timeout,
                    })
                }
                Err(ServeError::Io(source)) if !policy.should_retry(attempt) => {
                    return Err(LifecycleError::Bind {
                        addr,
                        attempts: attempt,
                        source,
                    })
                }
                Err(ServeError::Io(source)) => {
                    tracing::warn!(
                        address = %addr,
                        attempt,
                        max_attempts = policy.attempts,
                        error = %source,
                        "Listen failed, retrying"
                    );
                    let mut signal = shutdown.clone();
                    tokio::select! {
                        _ = tokio::time::sleep(policy.delay) => {}
                        _ = signal.recv() => {
                            tracing::info!("Shutdown requested while retrying bind");
                            return Ok(());
                        }
                    }
                }
            }
        }
    }

    async fn serve_once(
        &self,
        addr: SocketAddr,
        drain_timeout: Duration,
        mut shutdown: ShutdownSignal,
    ) -> Result<(), ServeError> {
        self.state.set(LifecycleState::Starting);
        let listener = TcpListener::bind(addr).await.map_err(ServeError::Io)?;
        let local_addr = listener.local_addr().map_err(ServeError::Io)?;

        tracing::info!(address = %local_addr, "Listening for connections");
        self.state.set(LifecycleState::Listening { addr: local_addr });

        let mut connections = ConnectionSet::new();
        loop {
            tokio::select! {
                accepted = listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        connections.reap();
                        tracing::trace!(peer = %peer, active = connections.len(), "Connection accepted");
                        connections.serve(stream, peer, self.router.clone());
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Accept failed");
                        tokio::time::sleep(ACCEPT_ERROR_BACKOFF).await;
                    }
                },
                _ = shutdown.recv() => break,
            }
        }
        drop(listener);

        tracing::info!(
            timeout_ms = drain_timeout.as_millis() as u64,
            connections = connections.len(),
            "Shutting down server, draining in-flight requests"
        );
        self.state.set(LifecycleState::Draining);

        if connections.drain(drain_timeout).await {
            tracing::info!("HTTP server stopped");
            Ok(())
        } else {
            tracing::error!(
                timeout_ms = drain_timeout.as_millis() as u64,
                "Server forced to shutdown"
            );
            Err(ServeError::Forced)
        }
    }
}

/// Build the axum router from the route table plus middleware layers.
#[allow(deprecated)]
pub fn build_router(config: &ServerConfig, state: AppState) -> Router {
    let mut router = Router::new();
    for entry in ROUTES.iter() {
        router = router.route(entry.path, method_router(entry));
    }

    let router = router
        .fallback(fallback::handle)
        .layer(middleware::from_fn_with_state(state.clone(), static_files::serve))
        .layer(middleware::from_fn(metrics::track_requests))
        .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)));

    let router = if config.proxy.force_https {
        apply_force_https(router)
    } else {
        router
    };

    router
        .layer(propagate_request_id_layer())
        .layer(set_request_id_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Handler for one table entry. A method mismatch falls through to the
/// same fallback as an unknown path.
fn method_router(entry: &RouteEntry) -> MethodRouter<AppState> {
    let filter = MethodFilter::try_from(entry.method.clone()).unwrap_or(MethodFilter::GET);
    let router = match entry.kind {
        RouteKind::Upgrade => on(filter, websocket::upgrade),
        RouteKind::Ping => on(filter, api::ping),
        RouteKind::OAuthRedirect => on(filter, api::oauth_redirect),
        RouteKind::Upload => on(filter, api::upload),
    };
    router.fallback(fallback::handle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::extract::connect_info::MockConnectInfo;
    use axum::http::{header, Method, Request, StatusCode};
    use tempfile::TempDir;
    use tower::ServiceExt;

    const SHELL: &str = concat!(
        "<html><head><base href=\"/\">",
        "<script>var strategy = \"%FLET_ROUTE_URL_STRATEGY%\";</script>",
        "<!-- flutterWebRenderer --></head></html>"
    );

    fn fixture(pages: &[&str]) -> (TempDir, Router) {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("index.html"), SHELL).unwrap();
        std::fs::write(dir.path().join("main.js"), "console.log(1);").unwrap();

        let config = ServerConfig {
            content: crate::config::ContentConfig {
                content_dir: dir.path().to_string_lossy().into_owned(),
                ..Default::default()
            },
            api: crate::config::ApiConfig { ping_delay_ms: 0 },
            pages: pages.iter().map(|p| p.to_string()).collect(),
            ..Default::default()
        };
        let collaborators = Collaborators::from_config(&config);
        let router = HttpServer::new(config, collaborators)
            .router()
            .layer(MockConnectInfo(SocketAddr::from(([127, 0, 0, 1], 40000))));
        (dir, router)
    }

    async fn send(router: Router, method: Method, uri: &str) -> (StatusCode, String, String) {
        let response = router
            .oneshot(Request::builder().method(method).uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .map(|v| v.to_str().unwrap().to_string())
            .unwrap_or_default();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, content_type, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn unknown_api_path_is_json_404() {
        let (_dir, router) = fixture(&[]);
        let (status, content_type, body) = send(router, Method::GET, "/api/nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(content_type, "application/json");
        assert_eq!(body, r#"{"message":"API endpoint not found"}"#);
    }

    #[tokio::test]
    async fn ping_answers_pong() {
        let (_dir, router) = fixture(&[]);
        let (status, _, body) = send(router, Method::GET, "/api/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, r#"{"message":"pong"}"#);
    }

    #[tokio::test]
    async fn registered_page_scopes_base_href() {
        let (_dir, router) = fixture(&["dashboard/settings"]);
        let (status, content_type, body) =
            send(router, Method::GET, "/dashboard/settings/extra").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(content_type, "text/html");
        assert!(body.contains(r#"<base href="/dashboard/settings/">"#));
        assert!(body.contains(r#"var strategy = "path";"#));
        assert!(!body.contains("<!-- flutterWebRenderer -->"));
    }

    #[tokio::test]
    async fn encoded_page_name_is_decoded_before_lookup() {
        let (_dir, router) = fixture(&["my app/main"]);
        let (status, _, body) = send(router, Method::GET, "/my%20app/main/x").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains(r#"<base href="/my app/main/">"#));
    }

    #[tokio::test]
    async fn api_without_trailing_slash_serves_shell() {
        let (_dir, router) = fixture(&[]);
        let (status, content_type, body) = send(router, Method::GET, "/api").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(content_type, "text/html");
        assert!(body.contains(r#"<base href="/">"#));
    }

    #[tokio::test]
    async fn unknown_page_keeps_root_base_href() {
        let (_dir, router) = fixture(&["dashboard/settings"]);
        let (status, _, body) = send(router, Method::GET, "/unknown/thing").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains(r#"<base href="/">"#));
    }

    #[tokio::test]
    async fn shell_document_path_is_rewritten() {
        let (_dir, router) = fixture(&[]);
        let (status, _, body) = send(router, Method::GET, "/index.html").await;
        assert_eq!(status, StatusCode::OK);
        assert!(!body.contains("%FLET_ROUTE_URL_STRATEGY%"));
    }

    #[tokio::test]
    async fn static_files_are_served_before_routes() {
        let (_dir, router) = fixture(&[]);
        let (status, content_type, body) = send(router, Method::GET, "/main.js").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(content_type, "application/javascript");
        assert_eq!(body, "console.log(1);");
    }

    #[tokio::test]
    async fn wrong_method_on_api_route_is_json_404() {
        let (_dir, router) = fixture(&[]);
        let (status, _, body) = send(router, Method::GET, "/api/upload").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, r#"{"message":"API endpoint not found"}"#);
    }

    #[tokio::test]
    async fn delegated_routes_default_to_not_implemented() {
        let (_dir, router) = fixture(&[]);
        let (status, _, _) = send(router, Method::PUT, "/api/upload").await;
        assert_eq!(status, StatusCode::NOT_IMPLEMENTED);
    }

    #[tokio::test]
    async fn plain_get_on_upgrade_path_is_rejected() {
        let (_dir, router) = fixture(&[]);
        let (status, _, _) = send(router, Method::GET, "/ws").await;
        assert!(status.is_client_error());
    }

    #[tokio::test]
    async fn responses_carry_request_id() {
        let (_dir, router) = fixture(&[]);
        let response = router
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert!(response.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn missing_shell_is_server_error() {
        let (dir, router) = fixture(&[]);
        std::fs::remove_file(dir.path().join("index.html")).unwrap();
        let (status, _, body) = send(router, Method::GET, "/somewhere").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, r#"{"message":"shell document not found"}"#);
    }
}
