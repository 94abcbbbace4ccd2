//! Cookie translation rules.
//!
//! Two independent rules feed the browser-facing cookies:
//! - header rule: cookies from the upstream `Set-Cookie` value
//! - body rule: an in-body `token` on a successful login
//!
//! Both are evaluated unconditionally; either, both or neither may fire.

use axum::response::Response;
use serde_json::Value;

use crate::cookies::{is_cookie_value, parse, CookieParseError, CookiePolicy, OutboundCookie};
use crate::observability::metrics;
use crate::relay::Endpoint;

/// How many `Set-Cookie` entries an endpoint relays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntrySelection {
    First,
    All,
}

/// Header rule: re-issue upstream cookies with hardened attributes.
///
/// Parse failures are logged and skipped; they never fail the request.
pub fn header_cookies(
    endpoint: Endpoint,
    raw: Option<&str>,
    selection: EntrySelection,
    policy: CookiePolicy,
    max_age_secs: Option<u64>,
) -> Vec<OutboundCookie> {
    let parsed = match selection {
        EntrySelection::First => vec![parse::parse_first(raw)],
        EntrySelection::All => parse::parse_all(raw),
    };

    parsed
        .into_iter()
        .filter_map(|result| match result {
            Ok(cookie) => Some(OutboundCookie::from_parsed(cookie, policy, max_age_secs)),
            Err(CookieParseError::Absent) => {
                tracing::debug!(endpoint = endpoint.as_str(), "No Set-Cookie from upstream");
                None
            }
            Err(e) => {
                tracing::warn!(endpoint = endpoint.as_str(), error = %e, "Skipping unparseable upstream cookie");
                metrics::record_cookie_parse_failure(endpoint.as_str());
                None
            }
        })
        .collect()
}

/// Body rule: `{"success": true, "token": "<non-empty>"}` yields a session cookie.
pub fn body_token_cookie(
    body: &Value,
    cookie_name: &str,
    policy: CookiePolicy,
    max_age_secs: Option<u64>,
) -> Option<OutboundCookie> {
    if body.get("success") != Some(&Value::Bool(true)) {
        return None;
    }

    match body.get("token") {
        Some(Value::String(token)) if token.is_empty() => None,
        Some(Value::String(token)) if !is_cookie_value(token) => {
            tracing::warn!(
                endpoint = Endpoint::Authenticate.as_str(),
                cookie = cookie_name,
                "Skipping body token outside the cookie-octet set"
            );
            metrics::record_cookie_parse_failure(Endpoint::Authenticate.as_str());
            None
        }
        Some(Value::String(token)) => Some(OutboundCookie::hardened(cookie_name, token.as_str(), policy, max_age_secs)),
        _ => None,
    }
}

/// Attach cookies to the browser-facing response.
///
/// Returns how many were attached; unrepresentable cookies are skipped.
pub fn attach_cookies(endpoint: Endpoint, response: &mut Response, cookies: &[OutboundCookie]) -> usize {
    let mut attached = 0;
    for cookie in cookies {
        match cookie.append_to(response.headers_mut()) {
            Ok(()) => attached += 1,
            Err(e) => {
                tracing::warn!(endpoint = endpoint.as_str(), error = %e, "Failed to set cookie");
                metrics::record_cookie_parse_failure(endpoint.as_str());
            }
        }
    }

    if attached > 0 {
        let names: Vec<&str> = cookies.iter().map(OutboundCookie::name).collect();
        tracing::debug!(endpoint = endpoint.as_str(), cookies = ?names, "Issued gateway cookies");
    }
    attached
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::SET_COOKIE;
    use serde_json::json;

    const POLICY: CookiePolicy = CookiePolicy { secure: false };

    #[test]
    fn test_first_entry_only() {
        let cookies = header_cookies(
            Endpoint::AntiForgery,
            Some("csrf=abc123; Path=/, other=1"),
            EntrySelection::First,
            POLICY,
            Some(3600),
        );
        assert_eq!(cookies.len(), 1);
        assert_eq!(
            cookies[0].to_header_string(),
            "csrf=abc123; Path=/; Max-Age=3600; HttpOnly; SameSite=Lax"
        );
    }

    #[test]
    fn test_all_entries_override_upstream_attributes() {
        let cookies = header_cookies(
            Endpoint::Authenticate,
            Some("sid=s1; Max-Age=60; SameSite=None, refresh=r1; Path=/auth"),
            EntrySelection::All,
            POLICY,
            Some(604_800),
        );
        let rendered: Vec<String> = cookies.iter().map(OutboundCookie::to_header_string).collect();
        assert_eq!(
            rendered,
            vec![
                "sid=s1; Path=/; Max-Age=604800; HttpOnly; SameSite=Lax",
                "refresh=r1; Path=/; Max-Age=604800; HttpOnly; SameSite=Lax",
            ]
        );
    }

    #[test]
    fn test_absent_and_malformed_yield_nothing() {
        assert!(header_cookies(Endpoint::AntiForgery, None, EntrySelection::First, POLICY, None).is_empty());
        assert!(header_cookies(Endpoint::AntiForgery, Some("garbage"), EntrySelection::First, POLICY, None).is_empty());
    }

    #[test]
    fn test_body_token_rule() {
        let cookie = body_token_cookie(&json!({"success": true, "token": "T1"}), "admin-token", POLICY, Some(604_800)).unwrap();
        assert_eq!(
            cookie.to_header_string(),
            "admin-token=T1; Path=/; Max-Age=604800; HttpOnly; SameSite=Lax"
        );

        assert!(body_token_cookie(&json!({"success": false, "token": "T1"}), "admin-token", POLICY, None).is_none());
        assert!(body_token_cookie(&json!({"success": "true", "token": "T1"}), "admin-token", POLICY, None).is_none());
        assert!(body_token_cookie(&json!({"success": true, "token": ""}), "admin-token", POLICY, None).is_none());
        assert!(body_token_cookie(&json!({"success": true, "token": 42}), "admin-token", POLICY, None).is_none());
        assert!(body_token_cookie(&json!({"success": true}), "admin-token", POLICY, None).is_none());
        assert!(body_token_cookie(&json!([1, 2]), "admin-token", POLICY, None).is_none());
    }

    #[test]
    fn test_body_token_cannot_carry_attributes() {
        let body = json!({"success": true, "token": "T1; Domain=evil.example; SameSite=None"});
        assert!(body_token_cookie(&body, "admin-token", POLICY, Some(604_800)).is_none());
        assert!(body_token_cookie(&json!({"success": true, "token": "a b"}), "admin-token", POLICY, None).is_none());
        assert!(body_token_cookie(&json!({"success": true, "token": "eyJ.a-b_c="}), "admin-token", POLICY, None).is_some());
    }

    #[test]
    fn test_attach_cookies() {
        let mut response = Response::new(axum::body::Body::empty());
        let cookies = vec![
            OutboundCookie::hardened("a", "1", POLICY, None),
            OutboundCookie::hardened("bad", "x\r\ny", POLICY, None),
            OutboundCookie::hardened("sneaky", "v; Domain=evil.example", POLICY, None),
            OutboundCookie::hardened("b", "2", POLICY, None),
        ];
        assert_eq!(attach_cookies(Endpoint::Authenticate, &mut response, &cookies), 2);
        assert_eq!(response.headers().get_all(SET_COOKIE).iter().count(), 2);
    }
}
