//! Errors that end the server's run.

use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;

/// Fatal lifecycle failures. Per-request errors never surface here.
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// The configured bind address could not be parsed.
    #[error("invalid bind address {address:?}")]
    InvalidAddress { address: String },

    /// Every bind/serve attempt failed.
    #[error("listen on {addr} failed after {attempts} attempts: {source}")]
    Bind {
        addr: SocketAddr,
        attempts: u32,
        #[source]
        source: std::io::Error,
    },

    /// In-flight requests did not finish within the drain timeout.
    #[error("server forced to shutdown: requests still running after {timeout:?}")]
    ForcedShutdown { timeout: Duration },
}

impl LifecycleError {
    /// True when the server was stopped by the drain deadline rather than a
    /// startup failure.
    pub fn is_forced_shutdown(&self) -> bool {
        matches!(self, LifecycleError::ForcedShutdown { .. })
    }
}
