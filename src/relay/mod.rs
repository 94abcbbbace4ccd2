//! Relay endpoints.
//!
//! # Data Flow
//! ```text
//! browser request
//!     → inbound.rs (forwarding headers, spoofed-marker check)
//!     → endpoint (anti_forgery / authenticate / admin_api)
//!         → AuthorityClient::send (one bounded call)
//!         → translate.rs (Set-Cookie → hardened cookies, body token → session cookie)
//!     → upstream JSON body + status, gateway cookies attached
//! ```
//!
//! # Design Decisions
//! - Stateless per request: the only shared state is immutable
//! - Upstream non-2xx answers are relayed, not remapped
//! - Cookie translation never fails a request

pub mod admin_api;
pub mod anti_forgery;
pub mod authenticate;
pub mod inbound;
pub mod translate;

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::DefaultBodyLimit,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};

use crate::config::{CookieConfig, GatewayConfig, UpstreamConfig};
use crate::cookies::{is_cookie_name, CookiePolicy};
use crate::error::{GatewayError, StartupError};
use crate::observability::metrics;
use crate::security::TrustMarker;
use crate::upstream::AuthorityClient;

pub use admin_api::admin_api;
pub use anti_forgery::obtain_anti_forgery_token;
pub use authenticate::authenticate;
pub use inbound::InboundRequest;

pub const ANTI_FORGERY_ROUTE: &str = "/obtain-anti-forgery-token";
pub const AUTHENTICATE_ROUTE: &str = "/authenticate";
pub const ADMIN_API_ROUTE_PREFIX: &str = "/admin-api";

/// Which relay endpoint handled a request. Used for logs and metric labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    AntiForgery,
    Authenticate,
    AdminApi,
}

impl Endpoint {
    pub fn as_str(&self) -> &'static str {
        match self {
            Endpoint::AntiForgery => "anti_forgery",
            Endpoint::Authenticate => "authenticate",
            Endpoint::AdminApi => "admin_api",
        }
    }
}

/// Everything the relay endpoints share. Built once, read-only afterwards.
#[derive(Debug)]
pub struct Relay {
    pub client: AuthorityClient,
    pub trust_marker: TrustMarker,
    pub cookie_policy: CookiePolicy,
    pub cookies: CookieConfig,
    pub upstream: UpstreamConfig,
    pub max_body_size: usize,
}

impl Relay {
    pub fn new(config: &GatewayConfig) -> Result<Self, StartupError> {
        if !is_cookie_name(&config.cookies.session_cookie_name) {
            return Err(StartupError::Cookies(format!(
                "'{}' is not a valid cookie name",
                config.cookies.session_cookie_name
            )));
        }

        Ok(Self {
            client: AuthorityClient::new(&config.upstream)?,
            trust_marker: TrustMarker::from_config(&config.trust_marker)?,
            cookie_policy: CookiePolicy::for_mode(config.upstream.mode),
            cookies: config.cookies.clone(),
            upstream: config.upstream.clone(),
            max_body_size: config.listener.max_body_size,
        })
    }
}

/// Routes served by the relay.
pub fn routes(relay: Arc<Relay>) -> Router {
    let max_body_size = relay.max_body_size;

    Router::new()
        .route(ANTI_FORGERY_ROUTE, get(obtain_anti_forgery_token))
        .route(AUTHENTICATE_ROUTE, post(authenticate))
        .route(
            "/admin-api/{*path}",
            get(admin_api)
                .post(admin_api)
                .put(admin_api)
                .patch(admin_api)
                .delete(admin_api),
        )
        .layer(DefaultBodyLimit::max(max_body_size))
        .with_state(relay)
}

/// Log, record metrics and render the outcome of one relayed request.
pub(crate) fn finish(endpoint: Endpoint, start: Instant, result: Result<Response, GatewayError>) -> Response {
    let response = match result {
        Ok(response) => {
            if !response.status().is_success() {
                tracing::info!(
                    endpoint = endpoint.as_str(),
                    status = response.status().as_u16(),
                    "Relaying authority failure status"
                );
            }
            response
        }
        Err(err) => {
            if err.is_upstream_failure() {
                tracing::error!(endpoint = endpoint.as_str(), error = %err, "Upstream call failed");
                metrics::record_upstream_failure(endpoint.as_str(), err.kind());
            } else {
                tracing::warn!(endpoint = endpoint.as_str(), error = %err, "Rejected inbound request");
            }
            err.into_response()
        }
    };

    metrics::record_relay(endpoint.as_str(), response.status().as_u16(), start);
    response
}
