//! Gateway error taxonomy.
//!
//! Every failure a relay endpoint can hit maps to one variant here, and every
//! variant renders as a JSON envelope so callers never see an empty or
//! non-JSON body. Upstream non-2xx answers are not errors: they are relayed
//! verbatim by the endpoints. Cookie parse failures are not errors either;
//! see [`crate::cookies::CookieParseError`].

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::http::response::ErrorEnvelope;
use crate::upstream::resolve::ResolveError;

/// Errors that abort a relayed request.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The upstream call did not finish within the configured bound.
    #[error("upstream request timed out after {0} seconds")]
    Timeout(u64),

    /// The upstream call could not be completed (DNS, connect, reset).
    #[error("upstream transport error: {0}")]
    Transport(#[source] reqwest::Error),

    /// The authority answered with a body that is not JSON.
    #[error("upstream returned a non-JSON body: {0}")]
    InvalidUpstreamBody(#[source] serde_json::Error),

    /// The inbound body could not be read or is not JSON.
    #[error("invalid request body: {0}")]
    InvalidInboundBody(String),

    /// The inbound body exceeded the configured size limit.
    #[error("request body exceeds {0} bytes")]
    BodyTooLarge(usize),

    /// The passthrough path tried to leave the admin API prefix.
    #[error("invalid request path: {0}")]
    InvalidPath(String),

    /// The whole request outlived the listener deadline.
    #[error("request exceeded the {0} second deadline")]
    RequestTimeout(u64),

    #[error("no route for {0}")]
    NotFound(String),

    #[error("method {0} not allowed")]
    MethodNotAllowed(String),
}

/// Result type for relay operations.
pub type GatewayResult<T> = Result<T, GatewayError>;

impl GatewayError {
    /// Classify a reqwest failure, keeping timeouts distinct.
    pub fn from_transport(err: reqwest::Error, timeout_secs: u64) -> Self {
        if err.is_timeout() {
            GatewayError::Timeout(timeout_secs)
        } else {
            GatewayError::Transport(err)
        }
    }

    /// HTTP status returned to the caller.
    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::Timeout(_)
            | GatewayError::Transport(_)
            | GatewayError::InvalidUpstreamBody(_) => StatusCode::INTERNAL_SERVER_ERROR,
            GatewayError::InvalidInboundBody(_) | GatewayError::InvalidPath(_) => StatusCode::BAD_REQUEST,
            GatewayError::BodyTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            GatewayError::RequestTimeout(_) => StatusCode::REQUEST_TIMEOUT,
            GatewayError::NotFound(_) => StatusCode::NOT_FOUND,
            GatewayError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
        }
    }

    /// Short label used for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            GatewayError::Timeout(_) => "timeout",
            GatewayError::Transport(_) => "transport",
            GatewayError::InvalidUpstreamBody(_) => "invalid_upstream_body",
            GatewayError::InvalidInboundBody(_) => "invalid_request_body",
            GatewayError::BodyTooLarge(_) => "body_too_large",
            GatewayError::InvalidPath(_) => "invalid_path",
            GatewayError::RequestTimeout(_) => "request_timeout",
            GatewayError::NotFound(_) => "not_found",
            GatewayError::MethodNotAllowed(_) => "method_not_allowed",
        }
    }

    /// Whether the failure happened on the upstream side of the gateway.
    pub fn is_upstream_failure(&self) -> bool {
        matches!(
            self,
            GatewayError::Timeout(_) | GatewayError::Transport(_) | GatewayError::InvalidUpstreamBody(_)
        )
    }

    fn envelope(&self) -> ErrorEnvelope {
        match self {
            GatewayError::Timeout(_)
            | GatewayError::Transport(_)
            | GatewayError::InvalidUpstreamBody(_) => ErrorEnvelope::internal(),
            GatewayError::InvalidInboundBody(_) => ErrorEnvelope::new("Invalid request body"),
            GatewayError::BodyTooLarge(_) => ErrorEnvelope::new("Request body too large"),
            GatewayError::InvalidPath(_) => ErrorEnvelope::new("Invalid request path"),
            GatewayError::RequestTimeout(_) => ErrorEnvelope::new("Request timeout"),
            GatewayError::NotFound(_) => ErrorEnvelope::new("Not found"),
            GatewayError::MethodNotAllowed(_) => ErrorEnvelope::new("Method not allowed"),
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        // Details stay in the logs; the caller only ever sees the envelope.
        (self.status_code(), self.envelope()).into_response()
    }
}

/// Errors raised while assembling the gateway at startup.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to build upstream client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("invalid backend address: {0}")]
    BackendAddress(#[from] ResolveError),

    #[error("invalid trust marker: {0}")]
    TrustMarker(String),

    #[error("invalid cookie settings: {0}")]
    Cookies(String),
}
