//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket};
use page_server::config::{ApiConfig, ContentConfig, LifecycleConfig, ListenerConfig};
use page_server::session::{ClientInfo, SessionFactory, SessionHandle};
use page_server::{Collaborators, HttpServer, LifecycleError, ServerConfig, Shutdown};
use tempfile::TempDir;
use tokio::task::JoinHandle;

pub const SHELL: &str = concat!(
    "<!DOCTYPE html><html><head>",
    "<base href=\"/\">",
    "<script>const routeStrategy = \"%FLET_ROUTE_URL_STRATEGY%\";</script>",
    "<!-- flutterWebRenderer -->",
    "<!-- useColorEmoji -->",
    "</head><body></body></html>"
);

/// Temporary content directory with a shell document and one script.
pub fn content_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("index.html"), SHELL).unwrap();
    std::fs::write(dir.path().join("main.dart.js"), "void main() {}").unwrap();
    dir
}

/// Loopback config on an ephemeral port with fast retries and no probe delay.
pub fn test_config(dir: &TempDir) -> ServerConfig {
    ServerConfig {
        listener: ListenerConfig {
            bind_ip: "127.0.0.1".into(),
            port: 0,
        },
        content: ContentConfig {
            content_dir: dir.path().to_string_lossy().into_owned(),
            ..Default::default()
        },
        api: ApiConfig { ping_delay_ms: 0 },
        lifecycle: LifecycleConfig {
            bind_attempts: 3,
            bind_retry_delay_ms: 10,
            drain_timeout_ms: 2000,
        },
        ..Default::default()
    }
}

/// Session factory that remembers every client it was handed.
#[derive(Default)]
pub struct RecordingSessionFactory {
    clients: Mutex<Vec<ClientInfo>>,
}

impl RecordingSessionFactory {
    pub fn clients(&self) -> Vec<ClientInfo> {
        self.clients.lock().unwrap().clone()
    }

    pub async fn wait_for_sessions(&self, count: usize) -> Vec<ClientInfo> {
        for _ in 0..100 {
            let clients = self.clients();
            if clients.len() >= count {
                return clients;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        self.clients()
    }
}

impl SessionFactory for RecordingSessionFactory {
    fn create(&self, mut connection: WebSocket, client: ClientInfo) -> SessionHandle {
        self.clients.lock().unwrap().push(client);
        tokio::spawn(async move {
            while let Some(Ok(frame)) = connection.recv().await {
                if let Message::Text(text) = frame {
                    if connection.send(Message::Text(text)).await.is_err() {
                        break;
                    }
                }
            }
        });
        SessionHandle::new()
    }
}

/// A server running on a background task.
pub struct RunningServer {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub handle: JoinHandle<Result<(), LifecycleError>>,
}

impl RunningServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Trigger shutdown and wait for `run` to return.
    pub async fn stop(self) -> Result<(), LifecycleError> {
        self.shutdown.trigger();
        tokio::time::timeout(Duration::from_secs(10), self.handle)
            .await
            .expect("server should stop")
            .expect("server task should not panic")
    }
}

/// Start a server and wait until it is listening.
pub async fn start(config: ServerConfig, collaborators: Collaborators) -> RunningServer {
    let server = HttpServer::new(config, collaborators);
    let mut state = server.state();
    let shutdown = Shutdown::new();
    let handle = tokio::spawn(server.run(shutdown.subscribe()));

    let listening = tokio::time::timeout(
        Duration::from_secs(5),
        state.wait_for(|s| s.local_addr().is_some()),
    )
    .await
    .expect("server should start listening")
    .expect("state channel open");
    let addr = listening.local_addr().unwrap();
    drop(listening);

    RunningServer {
        addr,
        shutdown,
        handle,
    }
}

/// Start with the built-in collaborators plus the given session factory.
pub async fn start_with_sessions(
    config: ServerConfig,
    sessions: Arc<RecordingSessionFactory>,
) -> RunningServer {
    let collaborators = Collaborators::from_config(&config).with_sessions(sessions);
    start(config, collaborators).await
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}
