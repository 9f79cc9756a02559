//! Error types for the embed bridge

use thiserror::Error;

/// Result type for embed bridge operations
pub type Result<T> = std::result::Result<T, EmbedError>;

/// Embed bridge error types
///
/// These only surface at the host-page boundary; the bridge itself drops
/// malformed inbound data silently and swallows outbound failures.
#[derive(Debug, Error)]
pub enum EmbedError {
    /// Posting a message to the parent frame failed
    #[error("Transport error: {0}")]
    Transport(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for EmbedError {
    fn from(err: serde_json::Error) -> Self {
        EmbedError::Serialization(err.to_string())
    }
}
