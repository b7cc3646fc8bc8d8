//! Result and error types for the core library

use thiserror::Error;

/// Core library error type
///
/// A metadata line that fails to decode is not an error: the comment falls
/// back to default settings and keeps its full content as text.
#[derive(Error, Debug)]
pub enum Error {
    /// A mutating operation was attempted without an auth token.
    /// Raised before any transport call is made.
    #[error("Authentication required: {0}")]
    AuthenticationRequired(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create an authentication-required error
    pub fn auth_required(msg: impl Into<String>) -> Self {
        Self::AuthenticationRequired(msg.into())
    }

    /// Create a transport error
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create a not found error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

/// Core library result type
pub type Result<T> = std::result::Result<T, Error>;
