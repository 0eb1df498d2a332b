/// Errors from cookie encoding and cookie transports.
#[derive(Debug, thiserror::Error)]
pub enum CookieError {
    /// No descriptor is configured for this cookie name.
    #[error("cookie {0:?} is not configured")]
    UnknownCookie(String),

    #[error("invalid cookie name: {0:?}")]
    InvalidName(String),

    #[error("value of cookie {name:?} contains characters not allowed in a cookie")]
    InvalidValue { name: String },

    /// The encoded cookie exceeds what the transport accepts. Usually too much
    /// state in one subtree.
    #[error("cookie {name:?} is {size} bytes, the limit is {max}")]
    TooLarge { name: String, size: usize, max: usize },

    #[error("failed to encode state for cookie {name:?}: {reason}")]
    Encode { name: String, reason: String },

    #[error("failed to decode cookie {name:?}: {reason}")]
    Decode { name: String, reason: String },

    #[error("cookie transport error: {0}")]
    Transport(String),
}

/// Result alias for cookie operations.
pub type CookieResult<T> = Result<T, CookieError>;
