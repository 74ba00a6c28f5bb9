//! Page server library.
//!
//! Serves a single-page web client: static assets, the shell document with
//! per-page base href rewriting, a small API surface and the WebSocket
//! upgrade that hands connections to the session layer.

pub mod assets;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod pages;
pub mod routing;
pub mod security;
pub mod session;
pub mod shell;

pub use config::schema::ServerConfig;
pub use http::{Collaborators, HttpServer};
pub use lifecycle::{LifecycleError, LifecycleState, Shutdown, ShutdownSignal};
