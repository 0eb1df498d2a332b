use std::collections::BTreeMap;
use std::fmt;
use std::sync::RwLock;

use http::header::{COOKIE, SET_COOKIE};
use http::{HeaderMap, HeaderValue};

use jarsync_types::{is_valid_cookie_name, CookieOptions};

use crate::error::{CookieError, CookieResult};
use crate::header::{
    format_removal, format_set_cookie, is_valid_cookie_value, parse_cookie_header, MAX_COOKIE_SIZE,
};
use crate::transport::CookieTransport;

/// Cookie transport for one server-side request/response pair.
///
/// Reads come from the request's `Cookie` header. Writes are recorded as
/// `Set-Cookie` header values for the response and are also visible to later
/// reads through this jar, so code running later in the same request sees
/// the cookies it wrote.
pub struct HttpCookieJar {
    request: BTreeMap<String, String>,
    /// `None` marks a cookie deleted during this request.
    written: RwLock<BTreeMap<String, Option<String>>>,
    set_cookie: RwLock<Vec<String>>,
}

impl HttpCookieJar {
    /// A jar for a request that carried no cookies.
    pub fn new() -> Self {
        Self::with_request_cookies(BTreeMap::new())
    }

    /// Build a jar from every `Cookie` header of a request.
    pub fn from_request_headers(headers: &HeaderMap) -> Self {
        let mut request = BTreeMap::new();
        for value in headers.get_all(COOKIE) {
            let Ok(value) = value.to_str() else {
                tracing::debug!("skipping non-ASCII Cookie header");
                continue;
            };
            for (name, value) in parse_cookie_header(value) {
                request.entry(name).or_insert(value);
            }
        }
        Self::with_request_cookies(request)
    }

    /// Build a jar from a single `Cookie` header value.
    pub fn from_cookie_header(header: &str) -> Self {
        Self::with_request_cookies(parse_cookie_header(header))
    }

    fn with_request_cookies(request: BTreeMap<String, String>) -> Self {
        Self {
            request,
            written: RwLock::new(BTreeMap::new()),
            set_cookie: RwLock::new(Vec::new()),
        }
    }

    /// `Set-Cookie` values produced so far, in write order.
    pub fn set_cookie_headers(&self) -> Vec<String> {
        self.set_cookie.read().expect("lock poisoned").clone()
    }

    /// Append the collected `Set-Cookie` headers to a response header map.
    pub fn apply_to(&self, headers: &mut HeaderMap) -> CookieResult<()> {
        for line in self.set_cookie_headers() {
            let value = HeaderValue::from_str(&line)
                .map_err(|e| CookieError::Transport(format!("invalid Set-Cookie header: {e}")))?;
            headers.append(SET_COOKIE, value);
        }
        Ok(())
    }

    fn record(&self, name: &str, value: Option<&str>, line: String) {
        self.written
            .write()
            .expect("lock poisoned")
            .insert(name.to_string(), value.map(str::to_string));
        self.set_cookie.write().expect("lock poisoned").push(line);
    }
}

impl Default for HttpCookieJar {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for HttpCookieJar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpCookieJar")
            .field("request_cookies", &self.request.len())
            .field(
                "set_cookie_count",
                &self.set_cookie.read().expect("lock poisoned").len(),
            )
            .finish()
    }
}

impl CookieTransport for HttpCookieJar {
    fn get(&self, name: &str) -> Option<String> {
        if let Some(written) = self.written.read().expect("lock poisoned").get(name) {
            return written.clone();
        }
        self.request.get(name).cloned()
    }

    fn set(&self, name: &str, value: &str, options: &CookieOptions) -> CookieResult<()> {
        if !is_valid_cookie_name(name) {
            return Err(CookieError::InvalidName(name.to_string()));
        }
        if !is_valid_cookie_value(value) {
            return Err(CookieError::InvalidValue {
                name: name.to_string(),
            });
        }
        let size = name.len() + 1 + value.len();
        if size > MAX_COOKIE_SIZE {
            return Err(CookieError::TooLarge {
                name: name.to_string(),
                size,
                max: MAX_COOKIE_SIZE,
            });
        }

        self.record(name, Some(value), format_set_cookie(name, value, options));
        Ok(())
    }

    fn delete(&self, name: &str, options: &CookieOptions) -> CookieResult<()> {
        if !is_valid_cookie_name(name) {
            return Err(CookieError::InvalidName(name.to_string()));
        }
        self.record(name, None, format_removal(name, options));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_request_cookies() {
        let jar = HttpCookieJar::from_cookie_header("a=1; b=2");
        assert_eq!(jar.get("a").as_deref(), Some("1"));
        assert_eq!(jar.get("b").as_deref(), Some("2"));
        assert!(jar.get("c").is_none());
        assert!(jar.set_cookie_headers().is_empty());
    }

    #[test]
    fn reads_every_cookie_header() {
        let mut headers = HeaderMap::new();
        headers.append(COOKIE, HeaderValue::from_static("a=1"));
        headers.append(COOKIE, HeaderValue::from_static("b=2; a=ignored"));
        let jar = HttpCookieJar::from_request_headers(&headers);
        assert_eq!(jar.get("a").as_deref(), Some("1"));
        assert_eq!(jar.get("b").as_deref(), Some("2"));
    }

    #[test]
    fn writes_are_visible_to_later_reads() {
        let jar = HttpCookieJar::from_cookie_header("a=1; b=2");
        jar.set("a", "changed", &CookieOptions::default()).unwrap();
        jar.delete("b", &CookieOptions::default()).unwrap();

        assert_eq!(jar.get("a").as_deref(), Some("changed"));
        assert!(jar.get("b").is_none());
    }

    #[test]
    fn collects_set_cookie_lines() {
        let jar = HttpCookieJar::new();
        jar.set("a", "1", &CookieOptions::default()).unwrap();
        jar.delete("b", &CookieOptions::default()).unwrap();

        let lines = jar.set_cookie_headers();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "a=1; Path=/; SameSite=Strict");
        assert!(lines[1].starts_with("b=; Path=/; Expires=Thu, 01 Jan 1970 00:00:00 GMT"));
        assert!(lines[1].contains("Max-Age=0"));
        assert!(lines.iter().all(|l| !l.contains("HttpOnly")));
    }

    #[test]
    fn apply_to_appends_headers() {
        let jar = HttpCookieJar::new();
        jar.set("a", "1", &CookieOptions::default()).unwrap();
        jar.set("b", "2", &CookieOptions::default()).unwrap();

        let mut headers = HeaderMap::new();
        jar.apply_to(&mut headers).unwrap();
        let values: Vec<_> = headers
            .get_all(SET_COOKIE)
            .iter()
            .map(|v| v.to_str().unwrap().to_string())
            .collect();
        assert_eq!(values.len(), 2);
        assert!(values[1].starts_with("b=2;"));
    }

    #[test]
    fn rejects_invalid_writes() {
        let jar = HttpCookieJar::new();
        assert!(matches!(
            jar.set("a b", "1", &CookieOptions::default()),
            Err(CookieError::InvalidName(_))
        ));
        assert!(matches!(
            jar.set("a", "x y", &CookieOptions::default()),
            Err(CookieError::InvalidValue { .. })
        ));
        assert!(jar.set_cookie_headers().is_empty());
    }
}
