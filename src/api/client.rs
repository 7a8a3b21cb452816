//! Caller metadata derived from request headers.

use std::convert::Infallible;
use std::net::SocketAddr;

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::{HeaderMap, header, request::Parts};
use sha2::{Digest, Sha256};

/// Headers carrying the original client address, most trusted first.
const CLIENT_IP_HEADERS: &[&str] = &["cf-connecting-ip", "x-real-ip"];

/// What the service records about the submitter, before privacy reduction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientMeta {
    pub ip: Option<String>,
    pub user_agent: Option<String>,
}

impl ClientMeta {
    /// Read the client address and User-Agent from request parts.
    ///
    /// The address comes from the first of `CF-Connecting-IP`, `X-Real-IP`,
    /// the first `X-Forwarded-For` hop, then the TCP peer.
    pub fn from_parts(parts: &Parts) -> Self {
        let ip = header_ip(&parts.headers).or_else(|| {
            parts
                .extensions
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| addr.ip().to_string())
        });

        let user_agent = parts
            .headers
            .get(header::USER_AGENT)
            .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned());

        Self { ip, user_agent }
    }

    /// Privacy-reduced address, empty when unknown.
    pub fn ip_last4(&self) -> String {
        self.ip.as_deref().map(ip_last4).unwrap_or_default()
    }

    /// SHA-256 of the User-Agent; the empty-input digest when absent.
    pub fn ua_hash(&self) -> String {
        sha256_hex(self.user_agent.as_deref().unwrap_or_default())
    }
}

impl<S: Send + Sync> FromRequestParts<S> for ClientMeta {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_parts(parts))
    }
}

fn header_ip(headers: &HeaderMap) -> Option<String> {
    let single = CLIENT_IP_HEADERS
        .iter()
        .filter_map(|name| headers.get(*name))
        .filter_map(|v| v.to_str().ok())
        .map(str::trim)
        .find(|v| !v.is_empty());

    let forwarded = || {
        headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };

    single.or_else(forwarded).map(str::to_string)
}

/// Last dot-separated segment of an address.
///
/// IPv6 addresses without an embedded IPv4 part fall back to the last
/// colon-separated group.
pub fn ip_last4(ip: &str) -> String {
    let ip = ip.trim();
    let separator = if ip.contains('.') { '.' } else { ':' };
    ip.rsplit(separator).next().unwrap_or_default().to_string()
}

/// Lowercase hex SHA-256 digest of a string.
pub fn sha256_hex(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}
