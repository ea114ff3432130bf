//! Error types for the conversations module

use thiserror::Error;

/// Error types for the conversations module
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversationError {
    /// The key cannot be used by the backend
    #[error("invalid conversation key: {0}")]
    InvalidKey(String),
    /// Database error
    #[error("database error: {0}")]
    Database(String),
}
