//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the server.
//! All types derive Serde traits for deserialization from config files.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration for the page server.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServerConfig {
    /// Listener configuration (bind IP and port).
    pub listener: ListenerConfig,

    /// Where the web client and app assets live.
    pub content: ContentConfig,

    /// Values injected into the shell document.
    pub web: WebConfig,

    /// Trusted proxy and HTTPS policy.
    pub proxy: ProxyPolicyConfig,

    /// Built-in API endpoints.
    pub api: ApiConfig,

    /// Bind retry and shutdown drain settings.
    pub lifecycle: LifecycleConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Page identifiers known at startup (`"<segment>/<segment>"`).
    pub pages: Vec<String>,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// IP address to bind (e.g., "0.0.0.0").
    pub bind_ip: String,

    /// TCP port. `0` asks the OS for an ephemeral port.
    pub port: u16,
}

impl ListenerConfig {
    /// `ip:port` string suitable for parsing into a `SocketAddr`.
    pub fn bind_address(&self) -> String {
        if self.bind_ip.contains(':') {
            format!("[{}]:{}", self.bind_ip, self.port)
        } else {
            format!("{}:{}", self.bind_ip, self.port)
        }
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_ip: "0.0.0.0".to_string(),
            port: 8550,
        }
    }
}

/// Content directories.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ContentConfig {
    /// Directory holding the compiled web client. Required.
    pub content_dir: String,

    /// Optional directory with app assets; files here shadow `content_dir`.
    pub assets_dir: Option<String>,

    /// File name of the shell document inside the asset store.
    pub default_document: String,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            content_dir: String::new(),
            assets_dir: None,
            default_document: "index.html".to_string(),
        }
    }
}

/// Runtime values written into the shell document.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WebConfig {
    /// Route URL strategy token ("path" or "hash").
    pub route_url_strategy: String,

    /// Web renderer name; empty leaves the renderer marker untouched.
    pub web_renderer: String,

    /// Whether the client should use color emoji fonts.
    pub use_color_emoji: bool,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            route_url_strategy: "path".to_string(),
            web_renderer: String::new(),
            use_color_emoji: false,
        }
    }
}

/// Proxy trust and transport policy.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProxyPolicyConfig {
    /// IPs or CIDR blocks whose forwarding headers are honored.
    pub trusted_proxies: Vec<String>,

    /// Redirect plain HTTP to HTTPS and add strict transport headers.
    pub force_https: bool,
}

/// Built-in API settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Delay before the liveness probe answers, in milliseconds.
    pub ping_delay_ms: u64,
}

impl ApiConfig {
    pub fn ping_delay(&self) -> Duration {
        Duration::from_millis(self.ping_delay_ms)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self { ping_delay_ms: 4000 }
    }
}

/// Bind retry and graceful shutdown settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LifecycleConfig {
    /// Total bind/serve attempts before giving up.
    pub bind_attempts: u32,

    /// Fixed delay between bind attempts in milliseconds.
    pub bind_retry_delay_ms: u64,

    /// Upper bound for in-flight requests to finish after shutdown, in milliseconds.
    pub drain_timeout_ms: u64,
}

impl LifecycleConfig {
    pub fn bind_retry_delay(&self) -> Duration {
        Duration::from_millis(self.bind_retry_delay_ms)
    }

    pub fn drain_timeout(&self) -> Duration {
        Duration::from_millis(self.drain_timeout_ms)
    }
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            bind_attempts: 9,
            bind_retry_delay_ms: 100,
            drain_timeout_ms: 5000,
        }
    }
}

/// Timeout configuration for HTTP requests.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
