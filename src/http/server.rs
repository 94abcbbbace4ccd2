//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with the relay endpoints and the health probe
//! - Wire up middleware (request ID, tracing, request deadline)
//! - Answer unknown routes and methods with the JSON envelope
//! - Serve on a listener until shutdown, draining in-flight requests

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::Request,
    middleware::from_fn_with_state,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::Span;

use crate::config::GatewayConfig;
use crate::error::StartupError;
use crate::http::middleware::{enforce_deadline, method_not_allowed, not_found};
use crate::http::request::{request_id_of, MakeRequestUuidV4};
use crate::lifecycle::shutdown;
use crate::relay::{self, Relay};

/// Body of `GET /healthz`.
#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub version: &'static str,
}

/// HTTP server for the admin gateway.
pub struct GatewayServer {
    router: Router,
    config: GatewayConfig,
}

impl GatewayServer {
    /// Assemble the server. The configuration is expected to be validated.
    pub fn new(config: GatewayConfig) -> Result<Self, StartupError> {
        let relay = Arc::new(Relay::new(&config)?);
        let router = Self::build_router(&config, relay);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &GatewayConfig, relay: Arc<Relay>) -> Router {
        let deadline = Duration::from_secs(config.listener.request_timeout_secs);

        Router::new()
            .route("/healthz", get(health))
            .merge(relay::routes(relay))
            .method_not_allowed_fallback(method_not_allowed)
            .fallback(not_found)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV4))
                    .layer(TraceLayer::new_for_http().make_span_with(request_span))
                    .layer(PropagateRequestIdLayer::x_request_id())
                    .layer(from_fn_with_state(deadline, enforce_deadline)),
            )
    }

    /// Serve until `shutdown` fires, then drain in-flight requests.
    pub async fn run(self, listener: TcpListener, shutdown: broadcast::Receiver<()>) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            mode = %self.config.upstream.mode,
            "Gateway listening"
        );

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown::wait_for(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

fn request_span(request: &Request<Body>) -> Span {
    tracing::info_span!(
        "request",
        method = %request.method(),
        path = %request.uri().path(),
        request_id = %request_id_of(request),
    )
}

async fn health() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}
