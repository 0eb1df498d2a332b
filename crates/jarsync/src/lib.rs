//! jarsync: keep selected subtrees of application state in cookies.
//!
//! This crate re-exports the public API of the jarsync crates:
//!
//! - `jarsync-types` — state snapshots, paths and subtree descriptors
//! - `jarsync-walker` — structural-sharing subtree walker
//! - `jarsync-config` — configuration parsing and default resolution
//! - `jarsync-cookies` — cookie codec, transports and the state cookie store
//! - `jarsync-middleware` — the synchronization middleware

pub use jarsync_config::{
    resolve, ConfigError, ConfigResult, MiddlewareConfig, SameSiteSetting, SubtreeConfig,
    SubtreeEntry, SubtreeOverrides,
};
pub use jarsync_cookies::{
    codec, CookieError, CookieResult, CookieState, CookieTransport, HttpCookieJar,
    MemoryCookieJar, StateCookies,
};
pub use jarsync_middleware::{
    bootstrap_store, import_cookie_state, merge_state, Action, CookieSyncMiddleware,
    PageContext, ReducerStore, Store, SyncError, SyncResult,
};
pub use jarsync_types::{
    CodecError, CookieOptions, DeserializeFn, Node, PathError, Runtime, SameSite, SerializeFn,
    StatePath, StateTree, SubtreeDescriptor,
};
pub use jarsync_walker::{try_walk, walk, TreeDraft};
