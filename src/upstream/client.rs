//! HTTP client for the backend authority.
//!
//! # Responsibilities
//! - Hold the resolved base URL and a pooled `reqwest` client
//! - Issue exactly one upstream call per relayed request, bounded by timeouts
//! - Capture status, content type, `Set-Cookie` and body for translation
//!
//! # Design Decisions
//! - No retries: a failed call is surfaced once, immediately
//! - Redirects are not followed, so a cookie set on a 3xx is never lost
//! - Dropping the returned future cancels the in-flight call

use std::time::{Duration, Instant};

use axum::body::Bytes;
use axum::http::{
    header::{CONTENT_TYPE, SET_COOKIE},
    HeaderMap, Method, StatusCode,
};
use url::Url;

use crate::config::UpstreamConfig;
use crate::error::{GatewayError, GatewayResult, StartupError};
use crate::upstream::resolve::{endpoint_url, resolve_base_url};

/// A call to the authority, built by a relay endpoint.
#[derive(Debug)]
pub struct UpstreamRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<Bytes>,
}

/// What the gateway keeps from the authority's answer.
#[derive(Debug)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub content_type: Option<String>,
    /// All `Set-Cookie` header lines, comma-joined in order.
    pub set_cookie: Option<String>,
    pub body: Bytes,
}

impl UpstreamResponse {
    pub fn raw_set_cookie(&self) -> Option<&str> {
        self.set_cookie.as_deref()
    }

    /// Whether the authority labelled its body as JSON.
    pub fn is_json(&self) -> bool {
        self.content_type
            .as_deref()
            .map(|ct| {
                let ct = ct.to_ascii_lowercase();
                ct.contains("application/json") || ct.contains("+json")
            })
            .unwrap_or(false)
    }

    /// Parse the body as JSON regardless of the declared content type.
    pub fn json(&self) -> GatewayResult<serde_json::Value> {
        serde_json::from_slice(&self.body).map_err(GatewayError::InvalidUpstreamBody)
    }
}

/// Client bound to one backend authority.
#[derive(Debug, Clone)]
pub struct AuthorityClient {
    http: reqwest::Client,
    base_url: Url,
    timeout_secs: u64,
}

impl AuthorityClient {
    /// Build the client from configuration. The base URL is fixed from here on.
    pub fn new(config: &UpstreamConfig) -> Result<Self, StartupError> {
        let base_url = resolve_base_url(config)?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        tracing::info!(
            base_url = %base_url,
            mode = %config.mode,
            timeout_secs = config.timeout_secs,
            "Authority client initialized"
        );

        Ok(Self {
            http,
            base_url,
            timeout_secs: config.timeout_secs,
        })
    }

    /// URL of an authority endpoint.
    pub fn endpoint(&self, path: &str, query: Option<&str>) -> Url {
        endpoint_url(&self.base_url, path, query)
    }

    /// Send one request to the authority and buffer its answer.
    pub async fn send(&self, request: UpstreamRequest) -> GatewayResult<UpstreamResponse> {
        let start = Instant::now();
        let method = request.method.clone();
        let path = request.url.path().to_string();

        let mut builder = self
            .http
            .request(request.method, request.url)
            .headers(request.headers);
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| GatewayError::from_transport(e, self.timeout_secs))?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        let set_cookie = join_set_cookie(response.headers());

        let body = response
            .bytes()
            .await
            .map_err(|e| GatewayError::from_transport(e, self.timeout_secs))?;

        tracing::debug!(
            method = %method,
            path = %path,
            status = status.as_u16(),
            set_cookie_present = set_cookie.is_some(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Upstream call completed"
        );

        Ok(UpstreamResponse {
            status,
            content_type,
            set_cookie,
            body,
        })
    }
}

/// Join every `Set-Cookie` line into one comma-separated value.
fn join_set_cookie(headers: &HeaderMap) -> Option<String> {
    let lines: Vec<&str> = headers
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| match v.to_str() {
            Ok(s) => Some(s),
            Err(_) => {
                tracing::warn!("Dropping non-ASCII Set-Cookie line from upstream");
                None
            }
        })
        .collect();

    if lines.is_empty() {
        None
    } else {
        Some(lines.join(", "))
    }
}
