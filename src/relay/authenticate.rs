//! `POST /authenticate`
//!
//! Credentials are opaque: the body is checked to be JSON and forwarded
//! byte-for-byte. The authority's verdict, including 401s, is relayed as-is.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    http::Method,
    response::Response,
};

use crate::error::GatewayResult;
use crate::http::response::json_response;
use crate::relay::inbound::require_json_body;
use crate::relay::translate::{attach_cookies, body_token_cookie, header_cookies, EntrySelection};
use crate::relay::{finish, Endpoint, InboundRequest, Relay};
use crate::upstream::UpstreamRequest;

pub async fn authenticate(
    State(relay): State<Arc<Relay>>,
    inbound: InboundRequest,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let start = Instant::now();
    let result = relay_authenticate(&relay, inbound, body).await;
    finish(Endpoint::Authenticate, start, result)
}

async fn relay_authenticate(
    relay: &Relay,
    inbound: InboundRequest,
    body: Result<Bytes, BytesRejection>,
) -> GatewayResult<Response> {
    let body = require_json_body(body, relay.max_body_size)?;

    let request = UpstreamRequest {
        method: Method::POST,
        url: relay.client.endpoint(&relay.upstream.authenticate_path, None),
        headers: inbound.forwarding.to_upstream(&relay.trust_marker, true),
        body: Some(body),
    };

    let upstream = relay.client.send(request).await?;
    let payload = upstream.json()?;

    let max_age = Some(relay.cookies.session_max_age_secs);
    let mut cookies = header_cookies(
        Endpoint::Authenticate,
        upstream.raw_set_cookie(),
        EntrySelection::All,
        relay.cookie_policy,
        max_age,
    );
    cookies.extend(body_token_cookie(
        &payload,
        &relay.cookies.session_cookie_name,
        relay.cookie_policy,
        max_age,
    ));

    let mut response = json_response(upstream.status, upstream.body);
    let issued = attach_cookies(Endpoint::Authenticate, &mut response, &cookies);

    tracing::info!(
        status = upstream.status.as_u16(),
        cookies_issued = issued,
        "Authentication relayed"
    );
    Ok(response)
}
