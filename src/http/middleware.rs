//! Request deadline and JSON fallbacks.
//!
//! Responses produced here go through [`GatewayError`], so an expired
//! deadline, an unknown route or an unsupported method still answers with
//! the JSON envelope.

use std::time::Duration;

use axum::{
    extract::{Request, State},
    http::{Method, Uri},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::error::GatewayError;

/// Bound the whole request, body read included, by the listener deadline.
///
/// Dropping the inner future cancels any in-flight upstream call.
pub async fn enforce_deadline(State(deadline): State<Duration>, request: Request, next: Next) -> Response {
    let path = request.uri().path().to_string();

    match tokio::time::timeout(deadline, next.run(request)).await {
        Ok(response) => response,
        Err(_) => {
            tracing::warn!(
                path = %path,
                deadline_secs = deadline.as_secs(),
                "Request deadline exceeded"
            );
            GatewayError::RequestTimeout(deadline.as_secs()).into_response()
        }
    }
}

pub async fn not_found(uri: Uri) -> Response {
    GatewayError::NotFound(uri.path().to_string()).into_response()
}

pub async fn method_not_allowed(method: Method) -> Response {
    GatewayError::MethodNotAllowed(method.to_string()).into_response()
}
