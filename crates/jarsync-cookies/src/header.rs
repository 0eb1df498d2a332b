//! Cookie header syntax shared by the transports.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use jarsync_types::CookieOptions;

/// Largest `name=value` pair browsers are required to store.
pub const MAX_COOKIE_SIZE: usize = 4096;

/// Returns `true` if every byte of `value` is an RFC 6265 `cookie-octet`.
pub fn is_valid_cookie_value(value: &str) -> bool {
    value
        .bytes()
        .all(|b| matches!(b, 0x21 | 0x23..=0x2B | 0x2D..=0x3A | 0x3C..=0x5B | 0x5D..=0x7E))
}

/// Parse a `Cookie` request header (`a=1; b=2`).
///
/// Malformed pairs are skipped. When a name repeats, the first occurrence wins
/// (user agents send the most specific cookie first).
pub fn parse_cookie_header(header: &str) -> BTreeMap<String, String> {
    let mut cookies = BTreeMap::new();
    for pair in header.split(';') {
        let Some((name, value)) = pair.trim().split_once('=') else {
            continue;
        };
        let name = name.trim();
        if name.is_empty() {
            continue;
        }
        let value = value.trim();
        let value = value
            .strip_prefix('"')
            .and_then(|v| v.strip_suffix('"'))
            .unwrap_or(value);
        cookies
            .entry(name.to_string())
            .or_insert_with(|| value.to_string());
    }
    cookies
}

/// Render a `Set-Cookie` header value. `HttpOnly` is never emitted.
pub fn format_set_cookie(name: &str, value: &str, options: &CookieOptions) -> String {
    let mut out = format!("{name}={value}; Path={}", options.path);
    if let Some(domain) = &options.domain {
        out.push_str(&format!("; Domain={domain}"));
    }
    if let Some(expires) = &options.expires {
        out.push_str(&format!("; Expires={}", http_date(expires)));
    }
    if let Some(max_age) = options.max_age {
        out.push_str(&format!("; Max-Age={max_age}"));
    }
    if let Some(same_site) = options.same_site {
        out.push_str(&format!("; SameSite={same_site}"));
    }
    if options.secure {
        out.push_str("; Secure");
    }
    out
}

/// Render a `Set-Cookie` header value that removes cookie `name`.
pub fn format_removal(name: &str, options: &CookieOptions) -> String {
    let expired = CookieOptions {
        expires: Some(DateTime::<Utc>::default()),
        max_age: Some(0),
        ..options.clone()
    };
    format_set_cookie(name, "", &expired)
}

fn http_date(at: &DateTime<Utc>) -> String {
    at.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use jarsync_types::SameSite;

    #[test]
    fn parses_cookie_header() {
        let cookies = parse_cookie_header("a=1; b=two;c=\"quoted\"; broken; =nameless; a=shadowed");
        assert_eq!(cookies.len(), 3);
        assert_eq!(cookies["a"], "1");
        assert_eq!(cookies["b"], "two");
        assert_eq!(cookies["c"], "quoted");
    }

    #[test]
    fn parses_empty_header() {
        assert!(parse_cookie_header("").is_empty());
    }

    #[test]
    fn formats_default_options() {
        let header = format_set_cookie("counter", "5", &CookieOptions::default());
        assert_eq!(header, "counter=5; Path=/; SameSite=Strict");
    }

    #[test]
    fn formats_all_attributes() {
        let options = CookieOptions {
            path: "/app".into(),
            domain: Some("example.org".into()),
            expires: Some(Utc.with_ymd_and_hms(2030, 1, 2, 3, 4, 5).unwrap()),
            max_age: Some(60),
            same_site: Some(SameSite::Lax),
            secure: true,
        };
        assert_eq!(
            format_set_cookie("s", "v", &options),
            "s=v; Path=/app; Domain=example.org; Expires=Wed, 02 Jan 2030 03:04:05 GMT; \
             Max-Age=60; SameSite=Lax; Secure"
        );
    }

    #[test]
    fn removal_expires_immediately() {
        let options = CookieOptions {
            domain: Some("example.org".into()),
            ..CookieOptions::default()
        };
        assert_eq!(
            format_removal("gone", &options),
            "gone=; Path=/; Domain=example.org; Expires=Thu, 01 Jan 1970 00:00:00 GMT; \
             Max-Age=0; SameSite=Strict"
        );
    }

    #[test]
    fn never_emits_http_only() {
        let header = format_set_cookie("a", "b", &CookieOptions::default());
        assert!(!header.to_ascii_lowercase().contains("httponly"));
    }

    #[test]
    fn cookie_value_octets() {
        assert!(is_valid_cookie_value("abc-_.!~*'()%7B"));
        assert!(is_valid_cookie_value(""));
        assert!(!is_valid_cookie_value("has space"));
        assert!(!is_valid_cookie_value("semi;colon"));
        assert!(!is_valid_cookie_value("com,ma"));
        assert!(!is_valid_cookie_value("quote\""));
        assert!(!is_valid_cookie_value("back\\slash"));
    }
}
