//! Cookie codec and state cookie store for jarsync.
//!
//! One cookie holds the state of one configured subtree. This crate turns
//! subtree state into cookie-safe strings and back ([`codec`]), abstracts the
//! place cookies live behind [`CookieTransport`], and provides [`StateCookies`],
//! the isomorphic store the synchronization middleware talks to.
//!
//! # Transports
//!
//! - [`MemoryCookieJar`] -- a browser-document style jar held in memory
//! - [`HttpCookieJar`] -- reads the `Cookie` header of a request and collects
//!   `Set-Cookie` headers for the response
//!
//! # Cookie format
//!
//! The subtree state is serialized (JSON unless a custom serializer is
//! configured), then either compressed with zstd and encoded as unpadded
//! URL-safe base64, or percent-encoded like `encodeURIComponent`.
//!
//! Cookies are untrusted input: a value that fails to decode is logged and
//! treated as absent, never surfaced as an error.

pub mod codec;
pub mod error;
pub mod header;
pub mod memory;
pub mod request;
pub mod store;
pub mod transport;

pub use error::{CookieError, CookieResult};
pub use memory::MemoryCookieJar;
pub use request::HttpCookieJar;
pub use store::{CookieState, StateCookies};
pub use transport::CookieTransport;
