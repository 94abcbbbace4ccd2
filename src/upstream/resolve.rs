//! Backend address resolution.
//!
//! The authority's base URL is a pure function of configuration: an explicit
//! override wins, otherwise the deployment mode picks the production or the
//! local address. It is resolved once at startup and never rediscovered.

use thiserror::Error;
use url::Url;

use crate::config::schema::{DeploymentMode, UpstreamConfig};

/// Errors resolving the backend base URL.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("'{url}' is not a valid URL: {source}")]
    Invalid {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("'{0}' must use http or https")]
    UnsupportedScheme(String),
}

/// Pick the configured base URL string for the deployment mode.
pub fn select_base_url(config: &UpstreamConfig) -> &str {
    match (&config.base_url, config.mode) {
        (Some(url), _) => url,
        (None, DeploymentMode::Production) => &config.production_url,
        (None, DeploymentMode::Development) => &config.development_url,
    }
}

/// Resolve and parse the backend base URL.
pub fn resolve_base_url(config: &UpstreamConfig) -> Result<Url, ResolveError> {
    let raw = select_base_url(config);
    let url = Url::parse(raw).map_err(|source| ResolveError::Invalid {
        url: raw.to_string(),
        source,
    })?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        _ => Err(ResolveError::UnsupportedScheme(raw.to_string())),
    }
}

/// Build the URL of an upstream endpoint below `base`.
///
/// Any path already on the base URL is kept as a prefix.
pub fn endpoint_url(base: &Url, path: &str, query: Option<&str>) -> Url {
    let mut url = base.clone();
    let joined = format!(
        "{}/{}",
        base.path().trim_end_matches('/'),
        path.trim_start_matches('/')
    );
    url.set_path(&joined);
    url.set_query(query.filter(|q| !q.is_empty()));
    url
}
