//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Required startup parameters (content directory)
//! - Value ranges (attempts > 0, drain timeout > 0)
//! - Address and proxy list syntax
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServerConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::IpAddr;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::ServerConfig;
use crate::security::proxies::TrustedProxy;

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("content_dir is not set")]
    MissingContentDir,

    #[error("content_dir {0:?} is not a directory")]
    ContentDirNotFound(String),

    #[error("assets_dir {0:?} is not a directory")]
    AssetsDirNotFound(String),

    #[error("invalid bind_ip {0:?}")]
    InvalidBindIp(String),

    #[error("invalid trusted proxy {0:?}")]
    InvalidTrustedProxy(String),

    #[error("route_url_strategy must not be empty")]
    EmptyRouteStrategy,

    #[error("{0} must be greater than zero")]
    NonPositive(&'static str),

    #[error("invalid page identifier {0:?}")]
    InvalidPage(String),
}

/// Validate a loaded configuration, collecting every problem found.
pub fn validate_config(config: &ServerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let content_dir = config.content.content_dir.trim();
    if content_dir.is_empty() {
        errors.push(ValidationError::MissingContentDir);
    } else if !Path::new(content_dir).is_dir() {
        errors.push(ValidationError::ContentDirNotFound(content_dir.to_string()));
    }

    if let Some(assets_dir) = &config.content.assets_dir {
        if !Path::new(assets_dir).is_dir() {
            errors.push(ValidationError::AssetsDirNotFound(assets_dir.clone()));
        }
    }

    if config.listener.bind_ip.parse::<IpAddr>().is_err() {
        errors.push(ValidationError::InvalidBindIp(config.listener.bind_ip.clone()));
    }

    for proxy in &config.proxy.trusted_proxies {
        if proxy.parse::<TrustedProxy>().is_err() {
            errors.push(ValidationError::InvalidTrustedProxy(proxy.clone()));
        }
    }

    if config.web.route_url_strategy.trim().is_empty() {
        errors.push(ValidationError::EmptyRouteStrategy);
    }

    if config.lifecycle.bind_attempts == 0 {
        errors.push(ValidationError::NonPositive("lifecycle.bind_attempts"));
    }
    if config.lifecycle.drain_timeout_ms == 0 {
        errors.push(ValidationError::NonPositive("lifecycle.drain_timeout_ms"));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::NonPositive("timeouts.request_secs"));
    }

    for page in &config.pages {
        let segments: Vec<&str> = page.split('/').collect();
        if segments.len() != 2 || segments.iter().any(|s| s.is_empty()) {
            errors.push(ValidationError::InvalidPage(page.clone()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
