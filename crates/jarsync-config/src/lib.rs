//! Subtree configuration for jarsync.
//!
//! Users describe which state subtrees to persist with a [`MiddlewareConfig`]:
//! a list of subtree paths or [`SubtreeConfig`] objects, plus global defaults
//! that apply to every subtree unless overridden locally. [`resolve`] turns that
//! into fully defined [`SubtreeDescriptor`](jarsync_types::SubtreeDescriptor)s.
//!
//! # Precedence
//!
//! Field by field, later layers win:
//!
//! 1. Built-in defaults ([`SubtreeOverrides::builtin`])
//! 2. Global fields of the [`MiddlewareConfig`]
//! 3. Fields of the individual [`SubtreeConfig`]
//!
//! The cookie name defaults to the subtree's own path, never to a global value.
//! Compression defaults to on unless a custom codec is installed.
//!
//! ```
//! use jarsync_config::{MiddlewareConfig, SubtreeConfig, SubtreeOverrides};
//!
//! let config = MiddlewareConfig::new(["my.first.subtree"])
//!     .with_subtree(SubtreeConfig::new("three").with_overrides(SubtreeOverrides::default().with_secure(false)))
//!     .with_defaults(SubtreeOverrides::default().with_secure(true));
//!
//! let descriptors = config.resolve().unwrap();
//! assert!(descriptors[0].cookie_options.secure);
//! assert!(!descriptors[1].cookie_options.secure);
//! ```

pub mod config;
pub mod error;
pub mod overrides;
pub mod resolve;

pub use config::{MiddlewareConfig, SubtreeConfig, SubtreeEntry};
pub use error::{ConfigError, ConfigResult};
pub use overrides::{SameSiteSetting, SubtreeOverrides};
pub use resolve::resolve;
