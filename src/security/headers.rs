//! Forwarding headers and the proxy-trust marker.
//!
//! # Responsibilities
//! - Extract X-Forwarded-For, User-Agent, Origin and Cookie from the inbound request
//! - Build the fixed upstream header set from scratch
//! - Add the trust marker that tells the authority the call is a proxy hop
//!
//! # Design Decisions
//! - Upstream headers are never copied wholesale from the inbound request;
//!   only the fixed set below is forwarded
//! - The trust marker value comes from configuration only, so an inbound
//!   header of the same name can never reach the authority
//! - Cookie values are opaque and forwarded byte-for-byte

use std::net::SocketAddr;

use axum::http::{
    header::{CONTENT_TYPE, COOKIE, ORIGIN, USER_AGENT},
    HeaderMap, HeaderName, HeaderValue,
};

use crate::config::TrustMarkerConfig;
use crate::error::StartupError;

pub const X_FORWARDED_FOR: &str = "x-forwarded-for";

/// The private header marking a call as coming from the gateway.
#[derive(Debug, Clone)]
pub struct TrustMarker {
    name: HeaderName,
    value: HeaderValue,
}

impl TrustMarker {
    pub fn from_config(config: &TrustMarkerConfig) -> Result<Self, StartupError> {
        let name = HeaderName::from_bytes(config.header.as_bytes())
            .map_err(|e| StartupError::TrustMarker(format!("header '{}': {}", config.header, e)))?;
        let value = HeaderValue::from_str(&config.value)
            .map_err(|e| StartupError::TrustMarker(format!("value: {}", e)))?;
        Ok(Self { name, value })
    }

    pub fn name(&self) -> &HeaderName {
        &self.name
    }

    /// Whether an inbound request carries a header with the marker's name.
    pub fn is_present_in(&self, headers: &HeaderMap) -> bool {
        headers.contains_key(&self.name)
    }
}

/// Headers taken from the inbound request and forwarded upstream.
#[derive(Debug, Clone)]
pub struct ForwardingHeaders {
    pub forwarded_for: HeaderValue,
    pub user_agent: HeaderValue,
    pub origin: HeaderValue,
    /// Raw inbound cookie header, absent when the browser sent none.
    pub cookie: Option<HeaderValue>,
}

impl ForwardingHeaders {
    /// Extract the forwarding set from inbound headers.
    ///
    /// A missing X-Forwarded-For falls back to the peer address; other
    /// missing headers are forwarded empty.
    pub fn from_inbound(headers: &HeaderMap, peer: Option<SocketAddr>) -> Self {
        let forwarded_for = headers
            .get(X_FORWARDED_FOR)
            .cloned()
            .or_else(|| peer.and_then(|addr| HeaderValue::from_str(&addr.ip().to_string()).ok()))
            .unwrap_or_else(empty_value);

        Self {
            forwarded_for,
            user_agent: headers.get(USER_AGENT).cloned().unwrap_or_else(empty_value),
            origin: headers.get(ORIGIN).cloned().unwrap_or_else(empty_value),
            cookie: inbound_cookie(headers),
        }
    }

    /// Build the upstream header map.
    pub fn to_upstream(&self, marker: &TrustMarker, json_body: bool) -> HeaderMap {
        let mut headers = HeaderMap::with_capacity(6);
        headers.insert(HeaderName::from_static(X_FORWARDED_FOR), self.forwarded_for.clone());
        headers.insert(USER_AGENT, self.user_agent.clone());
        headers.insert(ORIGIN, self.origin.clone());
        if let Some(cookie) = &self.cookie {
            headers.insert(COOKIE, cookie.clone());
        }
        if json_body {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }
        headers.insert(marker.name.clone(), marker.value.clone());
        headers
    }
}

fn empty_value() -> HeaderValue {
    HeaderValue::from_static("")
}

/// Collect the inbound cookie header.
///
/// HTTP/2 clients may split cookies across several header fields; those are
/// rejoined with "; " so the authority sees a single header.
fn inbound_cookie(headers: &HeaderMap) -> Option<HeaderValue> {
    let mut values = headers.get_all(COOKIE).iter().filter(|v| !v.is_empty());
    let first = values.next()?.clone();

    let rest: Vec<&HeaderValue> = values.collect();
    if rest.is_empty() {
        return Some(first);
    }

    let mut joined = first.as_bytes().to_vec();
    for value in rest {
        joined.extend_from_slice(b"; ");
        joined.extend_from_slice(value.as_bytes());
    }
    HeaderValue::from_bytes(&joined).ok()
}
