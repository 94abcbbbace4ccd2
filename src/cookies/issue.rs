//! Hardened cookies issued on the gateway's own origin.

use std::fmt;

use axum::http::{header::SET_COOKIE, HeaderMap, HeaderValue};

use crate::config::DeploymentMode;
use crate::cookies::{is_cookie_name, is_cookie_value};
use crate::cookies::parse::{CookieParseError, ParsedCookie};

/// Security attributes shared by every cookie the gateway sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CookiePolicy {
    /// Emit the `Secure` attribute.
    pub secure: bool,
}

impl CookiePolicy {
    /// `Secure` is set exactly when running in production.
    pub fn for_mode(mode: DeploymentMode) -> Self {
        Self {
            secure: mode == DeploymentMode::Production,
        }
    }
}

/// A cookie re-issued to the browser.
///
/// Always `HttpOnly`, `SameSite=Lax` and `Path=/`; there is no way to build
/// one without those attributes.
#[derive(Clone, PartialEq, Eq)]
pub struct OutboundCookie {
    name: String,
    value: String,
    secure: bool,
    max_age_secs: Option<u64>,
}

impl OutboundCookie {
    pub const SAME_SITE: &'static str = "Lax";
    pub const PATH: &'static str = "/";

    pub fn hardened(
        name: impl Into<String>,
        value: impl Into<String>,
        policy: CookiePolicy,
        max_age_secs: Option<u64>,
    ) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            secure: policy.secure,
            max_age_secs,
        }
    }

    pub fn from_parsed(parsed: ParsedCookie, policy: CookiePolicy, max_age_secs: Option<u64>) -> Self {
        Self::hardened(parsed.name, parsed.value, policy, max_age_secs)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Render the `Set-Cookie` header value.
    pub fn to_header_string(&self) -> String {
        let mut out = format!("{}={}; Path={}", self.name, self.value, Self::PATH);
        if let Some(max_age) = self.max_age_secs {
            out.push_str(&format!("; Max-Age={}", max_age));
        }
        out.push_str("; HttpOnly; SameSite=");
        out.push_str(Self::SAME_SITE);
        if self.secure {
            out.push_str("; Secure");
        }
        out
    }

    /// Encode for the wire. Names and values outside RFC 6265 are refused so
    /// a value can never inject its own attributes.
    pub fn to_header_value(&self) -> Result<HeaderValue, CookieParseError> {
        if !is_cookie_name(&self.name) || !is_cookie_value(&self.value) {
            return Err(CookieParseError::Unrepresentable(self.name.clone()));
        }
        HeaderValue::from_str(&self.to_header_string())
            .map_err(|_| CookieParseError::Unrepresentable(self.name.clone()))
    }

    /// Append this cookie to a response header map.
    pub fn append_to(&self, headers: &mut HeaderMap) -> Result<(), CookieParseError> {
        headers.append(SET_COOKIE, self.to_header_value()?);
        Ok(())
    }
}

// Values are credentials; keep them out of debug output and logs.
impl fmt::Debug for OutboundCookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutboundCookie")
            .field("name", &self.name)
            .field("value", &"<redacted>")
            .field("secure", &self.secure)
            .field("max_age_secs", &self.max_age_secs)
            .finish()
    }
}
