use thiserror::Error;

/// Errors produced while parsing a [`StatePath`](crate::StatePath).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PathError {
    #[error("state path must not be empty")]
    Empty,

    #[error("state path {path:?} has an empty segment at position {position}")]
    EmptySegment { path: String, position: usize },
}

/// Failure reported by a custom serialization or deserialization function.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("codec error: {0}")]
pub struct CodecError(pub String);

impl CodecError {
    /// Build a codec error from any displayable message.
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}
