use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Cookie path applied when none is configured.
pub const DEFAULT_COOKIE_PATH: &str = "/";

/// Returns `true` if `name` is a valid cookie name (an RFC 6265 token).
pub fn is_valid_cookie_name(name: &str) -> bool {
    !name.is_empty()
        && name.bytes().all(|b| {
            b.is_ascii_graphic()
                && !matches!(
                    b,
                    b'(' | b')' | b'<' | b'>' | b'@' | b',' | b';' | b':' | b'\\' | b'"' | b'/'
                        | b'[' | b']' | b'?' | b'=' | b'{' | b'}'
                )
        })
}

/// The `SameSite` cookie attribute.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SameSite {
    Strict,
    Lax,
    None,
}

impl fmt::Display for SameSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SameSite::Strict => "Strict",
            SameSite::Lax => "Lax",
            SameSite::None => "None",
        })
    }
}

/// Transport-level attributes forwarded verbatim to every cookie write.
///
/// `HttpOnly` is deliberately absent: state cookies must stay readable and
/// writable from the browser, so transports never emit it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CookieOptions {
    pub path: String,
    pub domain: Option<String>,
    pub expires: Option<DateTime<Utc>>,
    /// Lifetime in seconds.
    pub max_age: Option<i64>,
    /// `None` omits the attribute.
    pub same_site: Option<SameSite>,
    pub secure: bool,
}

impl Default for CookieOptions {
    fn default() -> Self {
        Self {
            path: DEFAULT_COOKIE_PATH.to_string(),
            domain: None,
            expires: None,
            max_age: None,
            same_site: Some(SameSite::Strict),
            secure: false,
        }
    }
}
