use jarsync_types::PathError;

/// Errors raised while loading or resolving a configuration.
///
/// These are programmer errors: they surface at startup and are not retried.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid subtree path {subtree:?}: {source}")]
    InvalidSubtree { subtree: String, source: PathError },

    #[error("invalid cookie name {name:?} for subtree {subtree:?}")]
    InvalidCookieName { subtree: String, name: String },

    /// A key that names no option, usually a typo.
    #[error("unknown config key {key:?} in {location}")]
    UnknownKey { location: String, key: String },

    #[error("failed to parse TOML config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("failed to parse JSON config: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
