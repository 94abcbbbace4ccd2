//! `GET /obtain-anti-forgery-token`

use std::sync::Arc;
use std::time::Instant;

use axum::{extract::State, http::Method, response::Response};

use crate::error::GatewayResult;
use crate::http::response::json_response;
use crate::relay::translate::{attach_cookies, header_cookies, EntrySelection};
use crate::relay::{finish, Endpoint, InboundRequest, Relay};
use crate::upstream::UpstreamRequest;

pub async fn obtain_anti_forgery_token(State(relay): State<Arc<Relay>>, inbound: InboundRequest) -> Response {
    let start = Instant::now();
    let result = relay_anti_forgery(&relay, inbound).await;
    finish(Endpoint::AntiForgery, start, result)
}

async fn relay_anti_forgery(relay: &Relay, inbound: InboundRequest) -> GatewayResult<Response> {
    let request = UpstreamRequest {
        method: Method::GET,
        url: relay.client.endpoint(&relay.upstream.anti_forgery_path, None),
        headers: inbound.forwarding.to_upstream(&relay.trust_marker, false),
        body: None,
    };

    let upstream = relay.client.send(request).await?;
    upstream.json()?;

    let cookies = header_cookies(
        Endpoint::AntiForgery,
        upstream.raw_set_cookie(),
        EntrySelection::First,
        relay.cookie_policy,
        Some(relay.cookies.anti_forgery_max_age_secs),
    );

    let mut response = json_response(upstream.status, upstream.body);
    attach_cookies(Endpoint::AntiForgery, &mut response, &cookies);
    Ok(response)
}
