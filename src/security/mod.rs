//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → headers.rs (HTTPS redirect, hardening headers; when force_https)
//!     → proxies.rs (resolve client IP through trusted proxies)
//!     → Pass to dispatch
//! ```
//!
//! # Design Decisions
//! - No trust in client-supplied forwarding headers by default
//! - TLS itself is terminated outside this process

pub mod headers;
pub mod proxies;

pub use proxies::{TrustedProxies, TrustedProxy};
