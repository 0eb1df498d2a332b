use std::collections::BTreeMap;

use tracing::warn;

use jarsync_types::{is_valid_cookie_name, StatePath, SubtreeDescriptor};

use crate::config::{MiddlewareConfig, SubtreeEntry};
use crate::error::{ConfigError, ConfigResult};
use crate::overrides::SubtreeOverrides;

/// Resolve a [`MiddlewareConfig`] into one descriptor per subtree entry, in
/// entry order.
///
/// Pure: no I/O. Fails fast on malformed subtree paths and invalid cookie
/// names. Shared cookie names and overlapping subtree paths are accepted but
/// logged, since they make subtrees interfere with each other.
pub fn resolve(config: &MiddlewareConfig) -> ConfigResult<Vec<SubtreeDescriptor>> {
    reject_unknown(&config.unknown, || "the global options".to_string())?;
    let global = SubtreeOverrides::builtin().overlay(&config.defaults);
    let mut descriptors = Vec::with_capacity(config.subtrees.len());

    for entry in &config.subtrees {
        let (subtree, cookie_name, layer) = match entry {
            SubtreeEntry::Path(path) => (path.as_str(), None, global.clone()),
            SubtreeEntry::Detailed(detailed) => {
                reject_unknown(&detailed.unknown, || format!("subtree {:?}", detailed.subtree))?;
                (
                    detailed.subtree.as_str(),
                    detailed.cookie_name.as_deref(),
                    global.overlay(&detailed.overrides),
                )
            }
        };

        let path = StatePath::parse(subtree).map_err(|source| ConfigError::InvalidSubtree {
            subtree: subtree.to_string(),
            source,
        })?;

        let cookie_name = cookie_name.unwrap_or(subtree).to_string();
        if !is_valid_cookie_name(&cookie_name) {
            return Err(ConfigError::InvalidCookieName {
                subtree: subtree.to_string(),
                name: cookie_name,
            });
        }

        descriptors.push(layer.into_descriptor(path, cookie_name));
    }

    warn_on_interference(&descriptors);
    Ok(descriptors)
}

fn reject_unknown(
    unknown: &BTreeMap<String, serde_json::Value>,
    location: impl FnOnce() -> String,
) -> ConfigResult<()> {
    match unknown.keys().next() {
        Some(key) => Err(ConfigError::UnknownKey {
            location: location(),
            key: key.clone(),
        }),
        None => Ok(()),
    }
}

fn warn_on_interference(descriptors: &[SubtreeDescriptor]) {
    for (i, first) in descriptors.iter().enumerate() {
        for second in &descriptors[i + 1..] {
            if first.cookie_name == second.cookie_name {
                warn!(
                    cookie = %first.cookie_name,
                    first = %first.path,
                    second = %second.path,
                    "subtrees share a cookie name; the later one wins in the cookie jar"
                );
            }
            if first.path.overlaps(&second.path) {
                warn!(
                    first = %first.path,
                    second = %second.path,
                    "subtree paths overlap; writes to the later path win where they intersect"
                );
            }
        }
    }
}
