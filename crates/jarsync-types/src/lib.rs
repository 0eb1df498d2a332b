//! Foundation types for jarsync.
//!
//! jarsync keeps selected subtrees of an application's state tree in cookies
//! so that they survive page reloads and server-side rendering round trips.
//! Every other jarsync crate depends on `jarsync-types`.
//!
//! # Key Types
//!
//! - [`StateTree`] — Immutable, structurally shared JSON-like state snapshot
//! - [`StatePath`] — Dot-delimited location inside a [`StateTree`]
//! - [`SubtreeDescriptor`] — Fully resolved configuration for one synced subtree
//! - [`CookieOptions`] / [`SameSite`] — Transport attributes for cookie writes
//! - [`Runtime`] — Whether a component runs in the browser or on the server

pub mod descriptor;
pub mod error;
pub mod options;
pub mod path;
pub mod runtime;
pub mod tree;

pub use descriptor::{DeserializeFn, SerializeFn, SubtreeDescriptor};
pub use error::{CodecError, PathError};
pub use options::{is_valid_cookie_name, CookieOptions, SameSite, DEFAULT_COOKIE_PATH};
pub use path::StatePath;
pub use runtime::Runtime;
pub use tree::{Node, StateTree};
