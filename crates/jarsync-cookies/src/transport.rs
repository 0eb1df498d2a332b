use jarsync_types::CookieOptions;

use crate::error::CookieResult;

/// Where cookies are read from and written to.
///
/// On the server this wraps one HTTP request/response pair; in the browser it
/// wraps the document's cookies. Values cross this boundary already encoded and
/// are stored verbatim.
///
/// Implementations must never mark cookies `HttpOnly`: state cookies are read
/// and written from the browser as well.
pub trait CookieTransport: Send + Sync {
    /// The raw value of cookie `name`, if present.
    fn get(&self, name: &str) -> Option<String>;

    /// Create or overwrite cookie `name`.
    ///
    /// Errors (invalid name, oversized value, ...) propagate to the caller.
    fn set(&self, name: &str, value: &str, options: &CookieOptions) -> CookieResult<()>;

    /// Remove cookie `name`. `options` carries the path and domain the cookie
    /// was written with.
    fn delete(&self, name: &str, options: &CookieOptions) -> CookieResult<()>;
}
