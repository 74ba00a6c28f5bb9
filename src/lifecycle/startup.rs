//! Startup orchestration.
//!
//! # Responsibilities
//! - Resolve the bind address from configuration
//! - Bounded, fixed-delay bind retry policy
//! - Startup sanity checks that warn rather than fail
//!
//! # Design Decisions
//! - Fixed backoff, not exponential: bind failures are either a short-lived
//!   port release race or a misconfiguration
//! - Listeners start last (traffic only when ready)

use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use crate::config::{LifecycleConfig, ListenerConfig, ServerConfig};
use crate::lifecycle::error::LifecycleError;

/// How often and how fast to retry binding the listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub attempts: u32,
    /// Pause between attempts.
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &LifecycleConfig) -> Self {
        Self {
            attempts: config.bind_attempts.max(1),
            delay: config.bind_retry_delay(),
        }
    }

    /// Whether another attempt is allowed after `attempt` failed.
    pub fn should_retry(&self, attempt: u32) -> bool {
        attempt < self.attempts
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&LifecycleConfig::default())
    }
}

/// Parse the listener's `ip:port`.
pub fn resolve_bind_addr(listener: &ListenerConfig) -> Result<SocketAddr, LifecycleError> {
    let address = listener.bind_address();
    address
        .parse()
        .map_err(|_| LifecycleError::InvalidAddress { address })
}

/// Log the effective configuration and warn about a missing shell document.
pub fn log_startup(config: &ServerConfig) {
    tracing::info!(
        bind_address = %config.listener.bind_address(),
        content_dir = %config.content.content_dir,
        assets_dir = ?config.content.assets_dir,
        route_url_strategy = %config.web.route_url_strategy,
        web_renderer = %config.web.web_renderer,
        use_color_emoji = config.web.use_color_emoji,
        force_https = config.proxy.force_https,
        pages = config.pages.len(),
        "Configuration loaded"
    );

    if !config.proxy.trusted_proxies.is_empty() {
        tracing::info!(trusted_proxies = ?config.proxy.trusted_proxies, "Trusted proxies");
    }

    let shell = Path::new(&config.content.content_dir).join(&config.content.default_document);
    if !shell.is_file() {
        tracing::warn!(path = %shell.display(), "Shell document not found; client routes will fail");
    }
}
