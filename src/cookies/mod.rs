//! Cookie translation between the authority's origin and the gateway's.
//!
//! # Data Flow
//! ```text
//! upstream Set-Cookie value
//!     → parse.rs (split entries, extract name=value)
//!     → issue.rs (re-issue with HttpOnly, SameSite=Lax, Path=/, Max-Age)
//!     → appended to the browser-facing response
//! ```

pub mod issue;
pub mod parse;

pub use issue::{CookiePolicy, OutboundCookie};
pub use parse::{CookieParseError, ParsedCookie};

/// Whether `name` is a valid cookie name (an RFC 6265 token).
pub fn is_cookie_name(name: &str) -> bool {
    !name.is_empty()
        && name.bytes().all(|b| {
            b.is_ascii_graphic()
                && !matches!(
                    b,
                    b'(' | b')' | b'<' | b'>' | b'@' | b',' | b';' | b':' | b'\\' | b'"' | b'/' | b'['
                        | b']' | b'?' | b'=' | b'{' | b'}'
                )
        })
}

/// Whether `value` is an RFC 6265 `cookie-value`: cookie-octets, optionally
/// wrapped in double quotes. Rejects `;`, `,`, whitespace and `\`.
pub fn is_cookie_value(value: &str) -> bool {
    let inner = value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value);
    inner
        .bytes()
        .all(|b| matches!(b, 0x21 | 0x23..=0x2B | 0x2D..=0x3A | 0x3C..=0x5B | 0x5D..=0x7E))
}
