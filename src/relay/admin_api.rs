//! `/admin-api/{*path}` passthrough to the authority's admin API.
//!
//! Any admin call the browser makes goes through the same forwarding and
//! cookie contract as the login flow, so the authority never has to accept
//! cross-origin requests.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    http::{HeaderValue, Method, Uri},
    response::Response,
};
use serde_json::Value;

use crate::error::{GatewayError, GatewayResult};
use crate::http::response::{json_response, json_response_with_type};
use crate::relay::inbound::optional_json_body;
use crate::relay::translate::{attach_cookies, header_cookies, EntrySelection};
use crate::relay::{finish, Endpoint, InboundRequest, Relay, ADMIN_API_ROUTE_PREFIX};
use crate::upstream::{UpstreamRequest, UpstreamResponse};

pub async fn admin_api(
    State(relay): State<Arc<Relay>>,
    inbound: InboundRequest,
    method: Method,
    uri: Uri,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let start = Instant::now();
    let result = relay_admin_api(&relay, inbound, method, uri, body).await;
    finish(Endpoint::AdminApi, start, result)
}

async fn relay_admin_api(
    relay: &Relay,
    inbound: InboundRequest,
    method: Method,
    uri: Uri,
    body: Result<Bytes, BytesRejection>,
) -> GatewayResult<Response> {
    let sub_path = admin_sub_path(uri.path())?;
    let upstream_path = format!(
        "{}/{}",
        relay.upstream.admin_api_prefix.trim_end_matches('/'),
        sub_path
    );

    let body = if method == Method::GET || method == Method::HEAD {
        None
    } else {
        optional_json_body(body, relay.max_body_size)?
    };

    tracing::debug!(method = %method, path = %upstream_path, "Relaying admin API call");

    let request = UpstreamRequest {
        method,
        url: relay.client.endpoint(&upstream_path, uri.query()),
        headers: inbound.forwarding.to_upstream(&relay.trust_marker, true),
        body,
    };

    let upstream = relay.client.send(request).await?;

    let cookies = header_cookies(
        Endpoint::AdminApi,
        upstream.raw_set_cookie(),
        EntrySelection::First,
        relay.cookie_policy,
        None,
    );

    let mut response = into_json_response(upstream)?;
    attach_cookies(Endpoint::AdminApi, &mut response, &cookies);
    Ok(response)
}

/// Strip the route prefix and refuse dot segments that would climb out of
/// the admin API on the authority.
fn admin_sub_path(path: &str) -> GatewayResult<&str> {
    let sub_path = path
        .strip_prefix(ADMIN_API_ROUTE_PREFIX)
        .unwrap_or(path)
        .trim_start_matches('/');

    let climbs = sub_path.split('/').any(|segment| {
        let decoded = segment.to_ascii_lowercase().replace("%2e", ".");
        decoded == "." || decoded == ".."
    });
    if climbs || sub_path.is_empty() {
        return Err(GatewayError::InvalidPath(path.to_string()));
    }
    Ok(sub_path)
}

/// JSON bodies pass through verbatim; anything else is wrapped as a JSON string.
fn into_json_response(upstream: UpstreamResponse) -> GatewayResult<Response> {
    if upstream.is_json() {
        if upstream.body.is_empty() {
            return Ok(json_response(upstream.status, Bytes::from_static(b"null")));
        }
        upstream.json()?;
        let content_type = upstream
            .content_type
            .as_deref()
            .and_then(|ct| HeaderValue::from_str(ct).ok())
            .unwrap_or_else(|| HeaderValue::from_static("application/json"));
        return Ok(json_response_with_type(upstream.status, upstream.body, content_type));
    }

    let text = String::from_utf8_lossy(&upstream.body).into_owned();
    let wrapped = serde_json::to_vec(&Value::String(text)).map_err(GatewayError::InvalidUpstreamBody)?;
    Ok(json_response(upstream.status, Bytes::from(wrapped)))
}
