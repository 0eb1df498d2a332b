//! Cookie synchronization middleware for jarsync.
//!
//! [`CookieSyncMiddleware`] sits between the code that dispatches [`Action`]s
//! and the application [`Store`]. After every action it compares each
//! configured subtree before and after, and writes changed subtrees to their
//! cookies (or deletes the cookie when the subtree returns to its default).
//!
//! Cookies reach the middleware through a [`PageContext`] passed in at
//! construction, or per request through
//! [`CookieSyncMiddleware::serve_cookies`]. There is no global notion of
//! "browser" or "server": the context decides.
//!
//! # Key Types
//!
//! - [`CookieSyncMiddleware`] — The middleware itself
//! - [`Action`] — Transitions passed through the middleware
//! - [`Store`] / [`ReducerStore`] — The downstream store
//! - [`PageContext`] — Where the store lives and which cookies it can reach
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use jarsync_config::MiddlewareConfig;
//! use jarsync_cookies::MemoryCookieJar;
//! use jarsync_middleware::{bootstrap_store, Action, CookieSyncMiddleware, PageContext, ReducerStore};
//! use jarsync_types::StateTree;
//!
//! let jar = Arc::new(MemoryCookieJar::new());
//! let context = PageContext::Browser(jar.clone());
//! let config = MiddlewareConfig::new(["counter"]);
//! let mut middleware = CookieSyncMiddleware::from_config(&config, &context).unwrap();
//!
//! let mut store = ReducerStore::new(StateTree::from(serde_json::json!({"counter": 0})), |state, action| {
//!     match action {
//!         Action::Custom { payload, .. } => StateTree::object([("counter", payload.clone())]),
//!         _ => state.clone(),
//!     }
//! });
//! bootstrap_store(&mut middleware, &mut store, &context).unwrap();
//!
//! middleware
//!     .dispatch(&mut store, Action::custom("set", StateTree::from(serde_json::json!(5))))
//!     .unwrap();
//! assert!(jar.raw("counter").is_some());
//! ```

pub mod action;
pub mod context;
pub mod error;
pub mod middleware;
pub mod store;

pub use action::{Action, BOOTSTRAP, HYDRATE, IMPORT_COOKIE_STATE};
pub use context::{bootstrap_store, import_cookie_state, PageContext};
pub use error::{SyncError, SyncResult};
pub use middleware::CookieSyncMiddleware;
pub use store::{merge_state, ReducerStore, Store};
