//! Inbound request extraction.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, ConnectInfo, FromRequestParts},
    http::{request::Parts, StatusCode},
};
use serde::de::IgnoredAny;

use crate::error::GatewayError;
use crate::observability::metrics;
use crate::relay::Relay;
use crate::security::ForwardingHeaders;

/// The parts of a browser request the relay forwards.
#[derive(Debug, Clone)]
pub struct InboundRequest {
    pub forwarding: ForwardingHeaders,
}

impl FromRequestParts<Arc<Relay>> for InboundRequest {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, relay: &Arc<Relay>) -> Result<Self, Self::Rejection> {
        if relay.trust_marker.is_present_in(&parts.headers) {
            // Never forwarded: upstream headers are built from scratch.
            tracing::warn!(
                header = %relay.trust_marker.name(),
                path = %parts.uri.path(),
                "Inbound request carried the proxy trust marker; ignoring it"
            );
            metrics::record_spoofed_trust_marker();
        }

        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);

        Ok(Self {
            forwarding: ForwardingHeaders::from_inbound(&parts.headers, peer),
        })
    }
}

/// Map a body extraction failure onto the gateway taxonomy.
pub fn body_rejection(rejection: BytesRejection, limit: usize) -> GatewayError {
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        GatewayError::BodyTooLarge(limit)
    } else {
        GatewayError::InvalidInboundBody(rejection.body_text())
    }
}

/// Require a JSON body and return its bytes unchanged.
pub fn require_json_body(body: Result<Bytes, BytesRejection>, limit: usize) -> Result<Bytes, GatewayError> {
    let body = body.map_err(|r| body_rejection(r, limit))?;
    if body.is_empty() {
        return Err(GatewayError::InvalidInboundBody("empty body".to_string()));
    }
    serde_json::from_slice::<IgnoredAny>(&body)
        .map_err(|e| GatewayError::InvalidInboundBody(e.to_string()))?;
    Ok(body)
}

/// Keep the body only when it is non-empty valid JSON.
pub fn optional_json_body(body: Result<Bytes, BytesRejection>, limit: usize) -> Result<Option<Bytes>, GatewayError> {
    let body = body.map_err(|r| body_rejection(r, limit))?;
    if body.is_empty() || serde_json::from_slice::<IgnoredAny>(&body).is_err() {
        return Ok(None);
    }
    Ok(Some(body))
}
