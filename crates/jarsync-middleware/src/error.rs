use jarsync_config::ConfigError;
use jarsync_cookies::CookieError;

/// Errors surfaced while synchronizing state with cookies.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// A cookie write or delete was rejected by the transport.
    #[error("cookie error: {0}")]
    Cookie(#[from] CookieError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Result alias for synchronization operations.
pub type SyncResult<T> = Result<T, SyncError>;
