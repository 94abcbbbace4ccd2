//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → headers.rs (extract forwarding set, detect spoofed trust marker)
//!     → relay builds upstream headers from scratch + trust marker
//! ```
//!
//! # Design Decisions
//! - No trust in client input: the trust marker is never read from a request
//! - Cookie security attributes are decided by the gateway, see `cookies`

pub mod headers;

pub use headers::{ForwardingHeaders, TrustMarker};
