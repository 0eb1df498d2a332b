use std::collections::BTreeMap;
use std::fmt;
use std::sync::RwLock;

use chrono::Utc;

use jarsync_types::{is_valid_cookie_name, CookieOptions};

use crate::error::{CookieError, CookieResult};
use crate::header::{is_valid_cookie_value, parse_cookie_header, MAX_COOKIE_SIZE};
use crate::transport::CookieTransport;

#[derive(Clone, Debug, PartialEq, Eq)]
struct StoredCookie {
    value: String,
    options: CookieOptions,
}

/// In-memory cookie jar with browser-document semantics.
///
/// Writes are visible to the next read. Writing a cookie that is already
/// expired removes it, as a browser would. Used as the browser transport and
/// in tests; cookies are keyed by name only.
pub struct MemoryCookieJar {
    cookies: RwLock<BTreeMap<String, StoredCookie>>,
}

impl MemoryCookieJar {
    pub fn new() -> Self {
        Self {
            cookies: RwLock::new(BTreeMap::new()),
        }
    }

    /// Seed the jar from a `document.cookie` style string (`a=1; b=2`).
    pub fn from_cookie_string(cookies: &str) -> Self {
        let jar = Self::new();
        for (name, value) in parse_cookie_header(cookies) {
            jar.insert_raw(name, value);
        }
        jar
    }

    /// Store a raw value without validation, as a tampering client could.
    pub fn insert_raw(&self, name: impl Into<String>, value: impl Into<String>) {
        self.cookies.write().expect("lock poisoned").insert(
            name.into(),
            StoredCookie {
                value: value.into(),
                options: CookieOptions::default(),
            },
        );
    }

    /// The stored value of cookie `name`.
    pub fn raw(&self, name: &str) -> Option<String> {
        let map = self.cookies.read().expect("lock poisoned");
        map.get(name).map(|c| c.value.clone())
    }

    /// The attributes cookie `name` was last written with.
    pub fn options(&self, name: &str) -> Option<CookieOptions> {
        let map = self.cookies.read().expect("lock poisoned");
        map.get(name).map(|c| c.options.clone())
    }

    pub fn len(&self) -> usize {
        self.cookies.read().expect("lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.cookies.read().expect("lock poisoned").is_empty()
    }

    pub fn clear(&self) {
        self.cookies.write().expect("lock poisoned").clear();
    }

    /// Sorted names of all stored cookies.
    pub fn names(&self) -> Vec<String> {
        let map = self.cookies.read().expect("lock poisoned");
        map.keys().cloned().collect()
    }

    /// All cookies rendered like `document.cookie`.
    pub fn document_cookie(&self) -> String {
        let map = self.cookies.read().expect("lock poisoned");
        map.iter()
            .map(|(name, c)| format!("{name}={}", c.value))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

impl Default for MemoryCookieJar {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MemoryCookieJar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryCookieJar")
            .field("cookie_count", &self.len())
            .finish()
    }
}

fn is_expired(options: &CookieOptions) -> bool {
    options.max_age.is_some_and(|age| age <= 0)
        || options.expires.is_some_and(|at| at <= Utc::now())
}

impl CookieTransport for MemoryCookieJar {
    fn get(&self, name: &str) -> Option<String> {
        self.raw(name)
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

        let mut map = self.cookies.write().expect("lock poisoned");
        if is_expired(options) {
            map.remove(name);
        } else {
            map.insert(
                name.to_string(),
                StoredCookie {
                    value: value.to_string(),
                    options: options.clone(),
                },
            );
        }
        Ok(())
    }

    fn delete(&self, name: &str, _options: &CookieOptions) -> CookieResult<()> {
        self.cookies.write().expect("lock poisoned").remove(name);
        Ok(())
    }
}
