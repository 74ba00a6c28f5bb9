//! Trusted proxy list and client address resolution.
//!
//! # Design Decisions
//! - Never trust `X-Forwarded-For` / `X-Real-IP` unless the peer is listed
//! - Walk `X-Forwarded-For` right to left, skipping trusted hops
//! - Entries are single IPs or CIDR blocks; IPv4 and IPv6 never match each other

use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use axum::http::HeaderMap;
use thiserror::Error;

pub const X_FORWARDED_FOR: &str = "x-forwarded-for";
pub const X_REAL_IP: &str = "x-real-ip";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid proxy address {0:?}")]
pub struct InvalidProxy(pub String);

/// A single trusted network: an address and a prefix length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrustedProxy {
    network: IpAddr,
    prefix: u8,
}

impl TrustedProxy {
    pub fn contains(&self, ip: IpAddr) -> bool {
        match (self.network, ip) {
            (IpAddr::V4(net), IpAddr::V4(ip)) => {
                let mask = mask_v4(self.prefix);
                u32::from(net) & mask == u32::from(ip) & mask
            }
            (IpAddr::V6(net), IpAddr::V6(ip)) => {
                let mask = mask_v6(self.prefix);
                u128::from(net) & mask == u128::from(ip) & mask
            }
            _ => false,
        }
    }
}

fn mask_v4(prefix: u8) -> u32 {
    if prefix == 0 {
        0
    } else {
        u32::MAX << (32 - u32::from(prefix))
    }
}

fn mask_v6(prefix: u8) -> u128 {
    if prefix == 0 {
        0
    } else {
        u128::MAX << (128 - u32::from(prefix))
    }
}

impl FromStr for TrustedProxy {
    type Err = InvalidProxy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || InvalidProxy(s.to_string());
        let (addr, prefix) = match s.trim().split_once('/') {
            Some((addr, prefix)) => (addr, Some(prefix)),
            None => (s.trim(), None),
        };

        let network: IpAddr = addr.parse().map_err(|_| invalid())?;
        let max = if network.is_ipv4() { 32 } else { 128 };
        let prefix = match prefix {
            Some(p) => p.parse::<u8>().map_err(|_| invalid())?,
            None => max,
        };
        if prefix > max {
            return Err(invalid());
        }

        Ok(Self { network, prefix })
    }
}

/// The configured set of proxies whose forwarding headers are believed.
#[derive(Debug, Clone, Default)]
pub struct TrustedProxies {
    entries: Vec<TrustedProxy>,
}

impl TrustedProxies {
    /// Parse every entry. Invalid entries are rejected by config validation,
    /// so here they are skipped with a warning.
    pub fn from_config(entries: &[String]) -> Self {
        let entries = entries
            .iter()
            .filter_map(|entry| match entry.parse() {
                Ok(proxy) => Some(proxy),
                Err(e) => {
                    tracing::warn!(error = %e, "Ignoring trusted proxy entry");
                    None
                }
            })
            .collect();
        Self { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_trusted(&self, ip: IpAddr) -> bool {
        self.entries.iter().any(|p| p.contains(ip))
    }

    /// Resolve the originating client IP for a request received from `peer`.
    pub fn client_ip(&self, peer: SocketAddr, headers: &HeaderMap) -> IpAddr {
        let peer_ip = peer.ip();
        if !self.is_trusted(peer_ip) {
            return peer_ip;
        }

        if let Some(forwarded) = headers.get(X_FORWARDED_FOR).and_then(|v| v.to_str().ok()) {
            let mut last_valid = None;
            for hop in forwarded.rsplit(',') {
                let Ok(ip) = hop.trim().parse::<IpAddr>() else {
                    break;
                };
                last_valid = Some(ip);
                if !self.is_trusted(ip) {
                    return ip;
                }
            }
            if let Some(ip) = last_valid {
                return ip;
            }
        }

        headers
            .get(X_REAL_IP)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(peer_ip)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn proxies(entries: &[&str]) -> TrustedProxies {
        let entries: Vec<String> = entries.iter().map(|s| s.to_string()).collect();
        TrustedProxies::from_config(&entries)
    }

    #[test]
    fn parses_ips_and_cidrs() {
        assert!("10.0.0.1".parse::<TrustedProxy>().is_ok());
        assert!("10.0.0.0/8".parse::<TrustedProxy>().is_ok());
        assert!("fd00::/8".parse::<TrustedProxy>().is_ok());
        assert!("10.0.0.0/33".parse::<TrustedProxy>().is_err());
        assert!("proxy.local".parse::<TrustedProxy>().is_err());
    }

    #[test]
    fn cidr_membership() {
        let net: TrustedProxy = "192.168.0.0/16".parse().unwrap();
        assert!(net.contains("192.168.4.2".parse().unwrap()));
        assert!(!net.contains("192.169.0.1".parse().unwrap()));
        assert!(!net.contains("::1".parse().unwrap()));

        let any: TrustedProxy = "0.0.0.0/0".parse().unwrap();
        assert!(any.contains("8.8.8.8".parse().unwrap()));
    }

    #[test]
    fn untrusted_peer_headers_are_ignored() {
        let trusted = proxies(&["10.0.0.0/8"]);
        let mut headers = HeaderMap::new();
        headers.insert(X_FORWARDED_FOR, HeaderValue::from_static("1.2.3.4"));

        let peer: SocketAddr = "203.0.113.9:5000".parse().unwrap();
        assert_eq!(trusted.client_ip(peer, &headers), peer.ip());
    }

    #[test]
    fn trusted_peer_uses_rightmost_untrusted_hop() {
        let trusted = proxies(&["10.0.0.0/8"]);
        let mut headers = HeaderMap::new();
        headers.insert(
            X_FORWARDED_FOR,
            HeaderValue::from_static("6.6.6.6, 1.2.3.4, 10.1.1.1"),
        );

        let peer: SocketAddr = "10.0.0.2:5000".parse().unwrap();
        assert_eq!(trusted.client_ip(peer, &headers), "1.2.3.4".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn trusted_peer_falls_back_to_real_ip() {
        let trusted = proxies(&["127.0.0.1"]);
        let mut headers = HeaderMap::new();
        headers.insert(X_REAL_IP, HeaderValue::from_static("198.51.100.7"));

        let peer: SocketAddr = "127.0.0.1:5000".parse().unwrap();
        assert_eq!(
            trusted.client_ip(peer, &headers),
            "198.51.100.7".parse::<IpAddr>().unwrap()
        );
    }
}
