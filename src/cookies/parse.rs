//! `Set-Cookie` parsing.
//!
//! The authority may emit several cookies in one header value, joined with
//! `,` at the top level and `;` between attributes. Splitting naively on `,`
//! corrupts entries whose `Expires=` date contains a comma, so a comma only
//! starts a new entry when the text after it opens with `name=`.
//!
//! Only the name and value are kept. Upstream attributes are discarded: the
//! gateway decides cookie security attributes on its own origin.

use thiserror::Error;

use crate::cookies::{is_cookie_name, is_cookie_value};

/// A cookie name/value pair taken from an upstream `Set-Cookie` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCookie {
    pub name: String,
    pub value: String,
}

/// Why an upstream cookie could not be relayed.
///
/// Messages never include cookie values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CookieParseError {
    #[error("no Set-Cookie header in upstream response")]
    Absent,

    #[error("cookie entry is empty")]
    Empty,

    #[error("cookie entry has no '=' separator")]
    MissingSeparator,

    #[error("cookie entry has an empty name")]
    EmptyName,

    #[error("'{0}' is not a valid cookie name")]
    InvalidName(String),

    #[error("cookie '{0}' has a value outside the cookie-octet set")]
    InvalidValue(String),

    #[error("cookie '{0}' cannot be encoded as a header value")]
    Unrepresentable(String),
}

/// Split a (possibly comma-joined) `Set-Cookie` value into its entries.
pub fn split_entries(raw: &str) -> Vec<&str> {
    let mut entries = Vec::new();
    let mut start = 0;

    for (idx, _) in raw.match_indices(',') {
        let rest = &raw[idx + 1..];
        if starts_new_entry(rest) {
            push_trimmed(&mut entries, &raw[start..idx]);
            start = idx + 1;
        }
    }
    push_trimmed(&mut entries, &raw[start..]);

    entries
}

fn push_trimmed<'a>(entries: &mut Vec<&'a str>, entry: &'a str) {
    let entry = entry.trim();
    if !entry.is_empty() {
        entries.push(entry);
    }
}

/// Whether the text following a comma begins a new `name=value` entry.
fn starts_new_entry(rest: &str) -> bool {
    let segment = rest.split(';').next().unwrap_or_default();
    match segment.split_once('=') {
        Some((name, _)) => is_cookie_name(name.trim()),
        None => false,
    }
}

/// Parse one entry: the segment before the first `;`, split on the first `=`.
pub fn parse_entry(entry: &str) -> Result<ParsedCookie, CookieParseError> {
    let name_value = entry.split(';').next().unwrap_or_default().trim();
    if name_value.is_empty() {
        return Err(CookieParseError::Empty);
    }

    let (name, value) = name_value
        .split_once('=')
        .ok_or(CookieParseError::MissingSeparator)?;

    let name = name.trim();
    if name.is_empty() {
        return Err(CookieParseError::EmptyName);
    }
    if !is_cookie_name(name) {
        return Err(CookieParseError::InvalidName(name.to_string()));
    }

    let value = value.trim();
    if !is_cookie_value(value) {
        return Err(CookieParseError::InvalidValue(name.to_string()));
    }

    Ok(ParsedCookie {
        name: name.to_string(),
        value: value.to_string(),
    })
}

/// Parse only the first entry of a `Set-Cookie` value.
pub fn parse_first(raw: Option<&str>) -> Result<ParsedCookie, CookieParseError> {
    let raw = raw.ok_or(CookieParseError::Absent)?;
    let first = split_entries(raw).into_iter().next().ok_or(CookieParseError::Empty)?;
    parse_entry(first)
}

/// Parse every entry of a `Set-Cookie` value, keeping per-entry failures.
pub fn parse_all(raw: Option<&str>) -> Vec<Result<ParsedCookie, CookieParseError>> {
    match raw {
        Some(raw) => split_entries(raw).into_iter().map(parse_entry).collect(),
        None => vec![Err(CookieParseError::Absent)],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cookie(name: &str, value: &str) -> ParsedCookie {
        ParsedCookie {
            name: name.into(),
            value: value.into(),
        }
    }

    #[test]
    fn test_single_entry() {
        assert_eq!(parse_first(Some("csrf=abc123; Path=/")), Ok(cookie("csrf", "abc123")));
    }

    #[test]
    fn test_value_keeps_later_equals() {
        assert_eq!(
            parse_entry("token=a.b.c==; HttpOnly"),
            Ok(cookie("token", "a.b.c=="))
        );
    }

    #[test]
    fn test_split_multiple_entries() {
        let raw = "sid=s1; Path=/; HttpOnly, csrf=c1; Path=/; SameSite=Strict";
        assert_eq!(
            split_entries(raw),
            vec!["sid=s1; Path=/; HttpOnly", "csrf=c1; Path=/; SameSite=Strict"]
        );
    }

    #[test]
    fn test_expires_comma_is_not_a_separator() {
        let raw = "sid=s1; Expires=Wed, 21 Oct 2026 07:28:00 GMT; Path=/, refresh=r1; Max-Age=60";
        let parsed: Vec<_> = parse_all(Some(raw)).into_iter().collect::<Result<_, _>>().unwrap();
        assert_eq!(parsed, vec![cookie("sid", "s1"), cookie("refresh", "r1")]);
    }

    #[test]
    fn test_first_of_many() {
        assert_eq!(parse_first(Some("a=1, b=2")), Ok(cookie("a", "1")));
    }

    #[test]
    fn test_malformed_entries() {
        assert_eq!(parse_first(None), Err(CookieParseError::Absent));
        assert_eq!(parse_first(Some("   ")), Err(CookieParseError::Empty));
        assert_eq!(parse_entry("novalue; Path=/"), Err(CookieParseError::MissingSeparator));
        assert_eq!(parse_entry("=orphan"), Err(CookieParseError::EmptyName));
        assert!(matches!(parse_entry("bad name=1"), Err(CookieParseError::InvalidName(_))));
        assert_eq!(
            parse_entry("sid=two words; Path=/"),
            Err(CookieParseError::InvalidValue("sid".into()))
        );
    }

    #[test]
    fn test_parse_all_keeps_good_entries() {
        let results = parse_all(Some("novalue, good=1; Path=/, also=2"));
        assert_eq!(results.len(), 3);
        assert_eq!(results[0], Err(CookieParseError::MissingSeparator));
        assert_eq!(results[1], Ok(cookie("good", "1")));
        assert_eq!(results[2], Ok(cookie("also", "2")));

        assert_eq!(parse_all(None), vec![Err(CookieParseError::Absent)]);
    }

    #[test]
    fn test_comma_inside_value_is_rejected() {
        // The comma is not followed by `name=`, so it stays inside the value.
        let results = parse_all(Some("sid=a,b; Path=/, ok=1"));
        assert_eq!(results[0], Err(CookieParseError::InvalidValue("sid".into())));
        assert_eq!(results[1], Ok(cookie("ok", "1")));
    }

    #[test]
    fn test_empty_value_is_allowed() {
        assert_eq!(parse_entry("sid=; Max-Age=0"), Ok(cookie("sid", "")));
    }
}
