use chrono::{DateTime, Utc};
use serde::Deserialize;

use jarsync_types::{
    CookieOptions, DeserializeFn, SameSite, SerializeFn, StatePath, StateTree, SubtreeDescriptor,
    DEFAULT_COOKIE_PATH,
};

/// The `same_site` option as users write it.
///
/// `true` means `Strict`, `false` omits the attribute, and a policy name picks
/// that policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum SameSiteSetting {
    Enabled(bool),
    Policy(SameSite),
}

impl SameSiteSetting {
    pub fn resolve(self) -> Option<SameSite> {
        match self {
            SameSiteSetting::Enabled(true) => Some(SameSite::Strict),
            SameSiteSetting::Enabled(false) => None,
            SameSiteSetting::Policy(policy) => Some(policy),
        }
    }
}

impl From<bool> for SameSiteSetting {
    fn from(enabled: bool) -> Self {
        SameSiteSetting::Enabled(enabled)
    }
}

impl From<SameSite> for SameSiteSetting {
    fn from(policy: SameSite) -> Self {
        SameSiteSetting::Policy(policy)
    }
}

/// A partial set of subtree options; one layer of the configuration.
///
/// Used both for global defaults and for per-subtree overrides. Custom codec
/// functions cannot come from a config file and are set with
/// [`SubtreeOverrides::with_codec`].
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SubtreeOverrides {
    /// Whether incoming hydration state (e.g. from a statically generated page)
    /// is replaced by cookie state for this subtree.
    pub ignore_state_from_static_props: Option<bool>,
    pub default_state: Option<StateTree>,
    pub compress: Option<bool>,
    #[serde(skip)]
    pub serialization_function: Option<SerializeFn>,
    #[serde(skip)]
    pub deserialization_function: Option<DeserializeFn>,

    // Cookie transport attributes.
    pub path: Option<String>,
    pub domain: Option<String>,
    pub expires: Option<DateTime<Utc>>,
    pub max_age: Option<i64>,
    pub same_site: Option<SameSiteSetting>,
    pub secure: Option<bool>,
}

impl SubtreeOverrides {
    /// The bottom layer every configuration is resolved against.
    pub fn builtin() -> Self {
        Self {
            ignore_state_from_static_props: Some(true),
            path: Some(DEFAULT_COOKIE_PATH.to_string()),
            same_site: Some(SameSiteSetting::Enabled(true)),
            ..Default::default()
        }
    }

    /// Layer `over` on top of `self`; every field set in `over` wins.
    pub fn overlay(&self, over: &SubtreeOverrides) -> SubtreeOverrides {
        SubtreeOverrides {
            ignore_state_from_static_props: over
                .ignore_state_from_static_props
                .or(self.ignore_state_from_static_props),
            default_state: over
                .default_state
                .clone()
                .or_else(|| self.default_state.clone()),
            compress: over.compress.or(self.compress),
            serialization_function: over
                .serialization_function
                .clone()
                .or_else(|| self.serialization_function.clone()),
            deserialization_function: over
                .deserialization_function
                .clone()
                .or_else(|| self.deserialization_function.clone()),
            path: over.path.clone().or_else(|| self.path.clone()),
            domain: over.domain.clone().or_else(|| self.domain.clone()),
            expires: over.expires.or(self.expires),
            max_age: over.max_age.or(self.max_age),
            same_site: over.same_site.or(self.same_site),
            secure: over.secure.or(self.secure),
        }
    }

    /// Collapse this layer into a descriptor. Anything still unset falls back
    /// to the built-in defaults.
    pub fn into_descriptor(self, path: StatePath, cookie_name: String) -> SubtreeDescriptor {
        let has_codec =
            self.serialization_function.is_some() || self.deserialization_function.is_some();
        let fallback = CookieOptions::default();

        SubtreeDescriptor {
            path,
            cookie_name,
            ignore_incoming_snapshot_state: self.ignore_state_from_static_props.unwrap_or(true),
            default_value: self.default_state,
            compress: self.compress.unwrap_or(!has_codec),
            serialize: self.serialization_function,
            deserialize: self.deserialization_function,
            cookie_options: CookieOptions {
                path: self.path.unwrap_or(fallback.path),
                domain: self.domain,
                expires: self.expires,
                max_age: self.max_age,
                same_site: self
                    .same_site
                    .map_or(fallback.same_site, SameSiteSetting::resolve),
                secure: self.secure.unwrap_or(fallback.secure),
            },
        }
    }

    pub fn with_ignore_state_from_static_props(mut self, ignore: bool) -> Self {
        self.ignore_state_from_static_props = Some(ignore);
        self
    }

    pub fn with_default_state(mut self, state: StateTree) -> Self {
        self.default_state = Some(state);
        self
    }

    pub fn with_compress(mut self, compress: bool) -> Self {
        self.compress = Some(compress);
        self
    }

    pub fn with_codec(mut self, serialize: SerializeFn, deserialize: DeserializeFn) -> Self {
        self.serialization_function = Some(serialize);
        self.deserialization_function = Some(deserialize);
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    pub fn with_expires(mut self, expires: DateTime<Utc>) -> Self {
        self.expires = Some(expires);
        self
    }

    pub fn with_max_age(mut self, seconds: i64) -> Self {
        self.max_age = Some(seconds);
        self
    }

    pub fn with_same_site(mut self, same_site: impl Into<SameSiteSetting>) -> Self {
        self.same_site = Some(same_site.into());
        self
    }

    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = Some(secure);
        self
    }
}
