//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (accept loop, Axum setup, middleware stack)
//!     → connections.rs (hyper connection, graceful drain)
//!     → request.rs (request ID)
//!     → static_files.rs (asset hit? answer directly)
//!     → route table:
//!         GET /ws              → websocket.rs (upgrade, session handoff)
//!         GET /api/            → api.rs (pong)
//!         /api/oauth, /upload  → api.rs (delegated)
//!     → fallback.rs (API 404 or rewritten shell)
//! ```

pub mod api;
pub mod connections;
pub mod fallback;
pub mod request;
pub mod server;
pub mod static_files;
pub mod websocket;

pub use api::{ApiDelegate, ApiMessage, UnavailableApi};
pub use request::{RequestIdExt, X_REQUEST_ID};
pub use server::{AppState, Collaborators, HttpServer};
