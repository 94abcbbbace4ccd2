//! Response construction.
//!
//! # Responsibilities
//! - Relay an upstream JSON body verbatim with its original status
//! - Render the generic JSON error envelope
//!
//! # Design Decisions
//! - Every body the gateway produces is JSON, including errors
//! - Upstream bodies are passed through as bytes, never re-serialized

use axum::{
    body::{Body, Bytes},
    http::{header::CONTENT_TYPE, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

pub const APPLICATION_JSON: &str = "application/json";

/// `{"success": false, "error": "..."}`
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ErrorEnvelope {
    pub success: bool,
    pub error: &'static str,
}

impl ErrorEnvelope {
    pub fn new(error: &'static str) -> Self {
        Self { success: false, error }
    }

    pub fn internal() -> Self {
        Self::new("Internal server error")
    }
}

impl IntoResponse for ErrorEnvelope {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// Build a JSON response from raw body bytes.
pub fn json_response(status: StatusCode, body: Bytes) -> Response {
    json_response_with_type(status, body, HeaderValue::from_static(APPLICATION_JSON))
}

/// Build a response with an explicit content type.
pub fn json_response_with_type(status: StatusCode, body: Bytes, content_type: HeaderValue) -> Response {
    let mut response = Response::new(Body::from(body));
    *response.status_mut() = status;
    response.headers_mut().insert(CONTENT_TYPE, content_type);
    response
}
