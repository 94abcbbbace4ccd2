//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, addresses parse)
//! - Check that the resolved backend address is usable for the deployment mode
//! - Check header and cookie names the gateway will emit
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::fmt;
use std::net::SocketAddr;

use axum::http::{HeaderName, HeaderValue};

use crate::config::schema::{DeploymentMode, GatewayConfig};
use crate::cookies::is_cookie_name;
use crate::upstream::resolve::resolve_base_url;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a configuration, collecting every problem found.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }
    if config.listener.max_body_size == 0 {
        errors.push(ValidationError::new("listener.max_body_size", "must be greater than 0"));
    }
    if config.listener.request_timeout_secs == 0 {
        errors.push(ValidationError::new("listener.request_timeout_secs", "must be greater than 0"));
    }

    validate_upstream(config, &mut errors);

    // The upstream bound must fire before the listener deadline.
    if config.listener.request_timeout_secs <= config.upstream.timeout_secs {
        errors.push(ValidationError::new(
            "listener.request_timeout_secs",
            format!(
                "must be greater than upstream.timeout_secs ({})",
                config.upstream.timeout_secs
            ),
        ));
    }

    let header_ok = HeaderName::from_bytes(config.trust_marker.header.as_bytes()).is_ok();
    if !header_ok {
        errors.push(ValidationError::new(
            "trust_marker.header",
            format!("'{}' is not a valid header name", config.trust_marker.header),
        ));
    }
    if HeaderValue::from_str(&config.trust_marker.value).is_err() {
        errors.push(ValidationError::new("trust_marker.value", "is not a valid header value"));
    }

    if !is_cookie_name(&config.cookies.session_cookie_name) {
        errors.push(ValidationError::new(
            "cookies.session_cookie_name",
            format!("'{}' is not a valid cookie name", config.cookies.session_cookie_name),
        ));
    }
    if config.cookies.anti_forgery_max_age_secs == 0 {
        errors.push(ValidationError::new("cookies.anti_forgery_max_age_secs", "must be greater than 0"));
    }
    if config.cookies.session_max_age_secs == 0 {
        errors.push(ValidationError::new("cookies.session_max_age_secs", "must be greater than 0"));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("'{}' is not a socket address", config.observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_upstream(config: &GatewayConfig, errors: &mut Vec<ValidationError>) {
    let upstream = &config.upstream;

    if upstream.timeout_secs == 0 {
        errors.push(ValidationError::new("upstream.timeout_secs", "must be greater than 0"));
    }
    if upstream.connect_timeout_secs == 0 {
        errors.push(ValidationError::new("upstream.connect_timeout_secs", "must be greater than 0"));
    }

    for (field, path) in [
        ("upstream.anti_forgery_path", &upstream.anti_forgery_path),
        ("upstream.authenticate_path", &upstream.authenticate_path),
        ("upstream.admin_api_prefix", &upstream.admin_api_prefix),
    ] {
        if !path.starts_with('/') {
            errors.push(ValidationError::new(field, format!("'{}' must start with '/'", path)));
        }
    }

    match resolve_base_url(upstream) {
        Ok(url) => {
            // An explicit override is trusted as-is, e.g. an in-cluster plain HTTP hop.
            if config.is_production()
                && upstream.base_url.is_none()
                && url.scheme() != "https"
            {
                errors.push(ValidationError::new(
                    "upstream.production_url",
                    "production backend must be reached over https",
                ));
            }
        }
        Err(e) => {
            let field = match (&upstream.base_url, upstream.mode) {
                (Some(_), _) => "upstream.base_url",
                (None, DeploymentMode::Production) => "upstream.production_url",
                (None, DeploymentMode::Development) => "upstream.development_url",
            };
            errors.push(ValidationError::new(field, e.to_string()));
        }
    }
}
