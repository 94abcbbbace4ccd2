//! Backend authority access.
//!
//! # Data Flow
//! ```text
//! UpstreamConfig
//!     → resolve.rs (deployment mode → fixed base URL, once at startup)
//!     → client.rs (AuthorityClient: one bounded call per relayed request)
//! ```

pub mod client;
pub mod resolve;

pub use client::{AuthorityClient, UpstreamRequest, UpstreamResponse};
