//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Root configuration for the admin gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address, inbound limits).
    pub listener: ListenerConfig,

    /// Backend authority settings.
    pub upstream: UpstreamConfig,

    /// Cookie re-issuing policy.
    pub cookies: CookieConfig,

    /// Proxy-trust marker sent on every upstream call.
    pub trust_marker: TrustMarkerConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl GatewayConfig {
    /// Whether the gateway runs in production mode.
    pub fn is_production(&self) -> bool {
        self.upstream.mode == DeploymentMode::Production
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Maximum inbound request body size in bytes.
    pub max_body_size: usize,

    /// Total time allowed for one inbound request, in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            max_body_size: 64 * 1024,
            request_timeout_secs: 30,
        }
    }
}

/// Deployment mode. Selects the backend address and the cookie `Secure` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DeploymentMode {
    Production,
    #[default]
    Development,
}

impl fmt::Display for DeploymentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeploymentMode::Production => write!(f, "production"),
            DeploymentMode::Development => write!(f, "development"),
        }
    }
}

impl FromStr for DeploymentMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Ok(DeploymentMode::Production),
            "development" | "dev" => Ok(DeploymentMode::Development),
            other => Err(format!("unknown deployment mode '{}'", other)),
        }
    }
}

/// Backend authority configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Deployment mode.
    pub mode: DeploymentMode,

    /// Base URL used in production.
    pub production_url: String,

    /// Base URL used outside production.
    pub development_url: String,

    /// Explicit base URL; wins over both per-mode URLs when set.
    pub base_url: Option<String>,

    /// Upper bound for one upstream call, in seconds.
    pub timeout_secs: u64,

    /// Connection establishment timeout in seconds.
    pub connect_timeout_secs: u64,

    /// Upstream path of the anti-forgery token endpoint.
    pub anti_forgery_path: String,

    /// Upstream path of the login endpoint.
    pub authenticate_path: String,

    /// Upstream prefix for the admin API passthrough.
    pub admin_api_prefix: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            mode: DeploymentMode::Development,
            production_url: "https://backend.invalid".to_string(),
            development_url: "http://localhost:3000".to_string(),
            base_url: None,
            timeout_secs: 10,
            connect_timeout_secs: 5,
            anti_forgery_path: "/api/admin/csrf-token".to_string(),
            authenticate_path: "/api/admin/login".to_string(),
            admin_api_prefix: "/api/admin".to_string(),
        }
    }
}

/// Cookie policy for cookies issued on the gateway's origin.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CookieConfig {
    /// Name of the session cookie set from an in-body token.
    pub session_cookie_name: String,

    /// Lifetime of relayed anti-forgery cookies, in seconds.
    pub anti_forgery_max_age_secs: u64,

    /// Lifetime of relayed session cookies, in seconds.
    pub session_max_age_secs: u64,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            session_cookie_name: "admin-token".to_string(),
            anti_forgery_max_age_secs: 60 * 60,
            session_max_age_secs: 60 * 60 * 24 * 7,
        }
    }
}

/// Header that tells the authority a call came through the gateway.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TrustMarkerConfig {
    /// Header name (case-insensitive).
    pub header: String,

    /// Header value.
    pub value: String,
}

impl Default for TrustMarkerConfig {
    fn default() -> Self {
        Self {
            header: "x-same-origin-proxy".to_string(),
            value: "true".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Default log filter, used when `RUST_LOG` is unset.
    pub log_filter: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_filter: "admin_gateway=info,tower_http=info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
