use std::collections::BTreeMap;

use serde::Deserialize;

use jarsync_types::SubtreeDescriptor;

use crate::error::ConfigResult;
use crate::overrides::SubtreeOverrides;

/// One entry of [`MiddlewareConfig::subtrees`]: a bare path or a detailed config.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum SubtreeEntry {
    Path(String),
    Detailed(SubtreeConfig),
}

impl From<&str> for SubtreeEntry {
    fn from(path: &str) -> Self {
        SubtreeEntry::Path(path.to_string())
    }
}

impl From<String> for SubtreeEntry {
    fn from(path: String) -> Self {
        SubtreeEntry::Path(path)
    }
}

impl From<SubtreeConfig> for SubtreeEntry {
    fn from(config: SubtreeConfig) -> Self {
        SubtreeEntry::Detailed(config)
    }
}

/// Detailed configuration for a single subtree.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct SubtreeConfig {
    /// Dot-delimited path of the subtree, e.g. `my.config`.
    pub subtree: String,
    /// Cookie name; defaults to [`Self::subtree`].
    #[serde(default)]
    pub cookie_name: Option<String>,
    #[serde(flatten)]
    pub overrides: SubtreeOverrides,
    /// Keys no option matched. [`crate::resolve`] rejects them.
    #[serde(flatten)]
    pub unknown: BTreeMap<String, serde_json::Value>,
}

impl SubtreeConfig {
    pub fn new(subtree: impl Into<String>) -> Self {
        Self {
            subtree: subtree.into(),
            cookie_name: None,
            overrides: SubtreeOverrides::default(),
            unknown: BTreeMap::new(),
        }
    }

    pub fn with_cookie_name(mut self, name: impl Into<String>) -> Self {
        self.cookie_name = Some(name.into());
        self
    }

    pub fn with_overrides(mut self, overrides: SubtreeOverrides) -> Self {
        self.overrides = overrides;
        self
    }
}

/// Top-level configuration: which subtrees to sync, and global defaults.
///
/// Every [`SubtreeOverrides`] field can be set globally. A TOML file looks like
///
/// ```toml
/// secure = true
/// subtrees = [
///     "my.first.subtree",
///     { subtree = "subtree.two" },
///     { subtree = "three", secure = false },
/// ]
/// ```
///
/// which sets `secure` for the cookies of `my.first.subtree` and
/// `subtree.two`, but not for `three`.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct MiddlewareConfig {
    pub subtrees: Vec<SubtreeEntry>,
    #[serde(flatten)]
    pub defaults: SubtreeOverrides,
    /// Top-level keys no option matched. [`crate::resolve`] rejects them.
    #[serde(flatten)]
    pub unknown: BTreeMap<String, serde_json::Value>,
}

impl MiddlewareConfig {
    pub fn new<I, E>(subtrees: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<SubtreeEntry>,
    {
        Self {
            subtrees: subtrees.into_iter().map(Into::into).collect(),
            defaults: SubtreeOverrides::default(),
            unknown: BTreeMap::new(),
        }
    }

    pub fn with_subtree(mut self, entry: impl Into<SubtreeEntry>) -> Self {
        self.subtrees.push(entry.into());
        self
    }

    pub fn with_defaults(mut self, defaults: SubtreeOverrides) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn from_toml_str(source: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(source)?)
    }

    pub fn from_json_str(source: &str) -> ConfigResult<Self> {
        Ok(serde_json::from_str(source)?)
    }

    /// Shorthand for [`crate::resolve`].
    pub fn resolve(&self) -> ConfigResult<Vec<SubtreeDescriptor>> {
        crate::resolve::resolve(self)
    }
}
