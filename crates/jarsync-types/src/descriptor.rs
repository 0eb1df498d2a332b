//! Resolved per-subtree configuration.

use std::fmt;
use std::sync::Arc;

use crate::error::CodecError;
use crate::options::CookieOptions;
use crate::path::StatePath;
use crate::tree::StateTree;

type SerializeFnInner = dyn Fn(&StateTree) -> Result<String, CodecError> + Send + Sync;
type DeserializeFnInner = dyn Fn(&str) -> Result<StateTree, CodecError> + Send + Sync;

/// Custom serializer turning subtree state into a string.
#[derive(Clone)]
pub struct SerializeFn(Arc<SerializeFnInner>);

impl SerializeFn {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&StateTree) -> Result<String, CodecError> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Stores string state as raw text and everything else as JSON.
    pub fn plain_string() -> Self {
        Self::new(|state| match state.as_str() {
            Some(s) => Ok(s.to_string()),
            None => Ok(state.to_string()),
        })
    }

    pub fn call(&self, state: &StateTree) -> Result<String, CodecError> {
        (self.0)(state)
    }
}

impl PartialEq for SerializeFn {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for SerializeFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SerializeFn(..)")
    }
}

/// Custom deserializer, the inverse of a [`SerializeFn`].
#[derive(Clone)]
pub struct DeserializeFn(Arc<DeserializeFnInner>);

impl DeserializeFn {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&str) -> Result<StateTree, CodecError> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Reads the raw cookie text back as string state.
    pub fn plain_string() -> Self {
        Self::new(|raw| Ok(StateTree::from(serde_json::Value::String(raw.to_string()))))
    }

    pub fn call(&self, raw: &str) -> Result<StateTree, CodecError> {
        (self.0)(raw)
    }
}

impl PartialEq for DeserializeFn {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for DeserializeFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DeserializeFn(..)")
    }
}

/// Canonical, fully defaulted configuration for one synced subtree.
///
/// Produced by the configuration resolver; every field is defined. Two
/// descriptors sharing a cookie jar should not share a `cookie_name`.
#[derive(Clone, Debug, PartialEq)]
pub struct SubtreeDescriptor {
    /// Location of the subtree in the state.
    pub path: StatePath,
    /// Name of the cookie holding the subtree's state.
    pub cookie_name: String,
    /// When `true`, incoming hydration state for this subtree is replaced by
    /// the cookie state before it reaches the store.
    pub ignore_incoming_snapshot_state: bool,
    /// State that stands for "unset": the cookie is deleted when the subtree
    /// equals it, and it is reported for the subtree when no cookie exists.
    pub default_value: Option<StateTree>,
    pub compress: bool,
    pub serialize: Option<SerializeFn>,
    pub deserialize: Option<DeserializeFn>,
    pub cookie_options: CookieOptions,
}

impl SubtreeDescriptor {
    /// A descriptor with built-in defaults: the cookie is named after the
    /// path, incoming hydration state is ignored, values are compressed.
    pub fn new(path: StatePath) -> Self {
        Self {
            cookie_name: path.to_string(),
            path,
            ignore_incoming_snapshot_state: true,
            default_value: None,
            compress: true,
            serialize: None,
            deserialize: None,
            cookie_options: CookieOptions::default(),
        }
    }

    pub fn with_cookie_name(mut self, name: impl Into<String>) -> Self {
        self.cookie_name = name.into();
        self
    }

    pub fn with_ignore_incoming_snapshot_state(mut self, ignore: bool) -> Self {
        self.ignore_incoming_snapshot_state = ignore;
        self
    }

    pub fn with_default_value(mut self, value: StateTree) -> Self {
        self.default_value = Some(value);
        self
    }

    pub fn with_compress(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }

    /// Install a custom codec. Compression stays as configured.
    pub fn with_codec(mut self, serialize: SerializeFn, deserialize: DeserializeFn) -> Self {
        self.serialize = Some(serialize);
        self.deserialize = Some(deserialize);
        self
    }

    pub fn with_cookie_options(mut self, options: CookieOptions) -> Self {
        self.cookie_options = options;
        self
    }

    /// Returns `true` if `value` equals the configured default value.
    pub fn is_default(&self, value: &StateTree) -> bool {
        self.default_value.as_ref() == Some(value)
    }
}
