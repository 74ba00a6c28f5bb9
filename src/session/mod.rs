//! Session handoff seam.
//!
//! After a successful upgrade the socket is moved into a [`SessionFactory`]
//! together with the caller's address and user agent. The server keeps no
//! reference to it afterwards and does not wait for it during shutdown.

use std::fmt;

use axum::extract::ws::{Message, WebSocket};
use uuid::Uuid;

/// Who is on the other end of an upgraded connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientInfo {
    /// Client IP, resolved through trusted proxies.
    pub remote_addr: String,
    /// `User-Agent` header, empty when absent.
    pub user_agent: String,
}

/// Opaque identifier returned by the session layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionHandle(Uuid);

impl SessionHandle {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn id(&self) -> Uuid {
        self.0
    }
}

impl Default for SessionHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session-{}", self.0)
    }
}

/// Constructs a session around an upgraded connection.
///
/// Called exactly once per successful upgrade, from the upgrade task. It must
/// not block: long-running work belongs in a task the factory spawns.
pub trait SessionFactory: Send + Sync {
    fn create(&self, connection: WebSocket, client: ClientInfo) -> SessionHandle;
}

/// Holds the connection open and discards inbound frames until the peer
/// closes. Used when no session layer is plugged in.
#[derive(Debug, Default, Clone, Copy)]
pub struct IdleSessionFactory;

impl SessionFactory for IdleSessionFactory {
    fn create(&self, mut connection: WebSocket, client: ClientInfo) -> SessionHandle {
        let handle = SessionHandle::new();
        tokio::spawn(async move {
            while let Some(frame) = connection.recv().await {
                match frame {
                    Ok(Message::Close(_)) => break,
                    Ok(_) => {}
                    Err(e) => {
                        tracing::debug!(session = %handle, error = %e, "Session read error");
                        break;
                    }
                }
            }
            tracing::debug!(
                session = %handle,
                remote_addr = %client.remote_addr,
                "Session closed"
            );
        });
        handle
    }
}
