//! Admin authentication gateway library.
//!
//! Relays admin authentication calls from the browser-facing origin to a
//! separate backend authority and re-issues the authority's cookies on the
//! gateway's own origin with hardened attributes.

pub mod config;
pub mod cookies;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod relay;
pub mod security;
pub mod upstream;

pub use config::GatewayConfig;
pub use error::{GatewayError, StartupError};
pub use http::GatewayServer;
pub use lifecycle::Shutdown;
