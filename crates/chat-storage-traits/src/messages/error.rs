//! Error types for the messages module

use std::fmt;

/// Error types for the messages module
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageError {
    /// Invalid parameters
    InvalidParameters(String),
    /// Database error
    DatabaseError(String),
    /// Conversation thread not found
    NotFound,
    /// A thread with this id already exists
    AlreadyExists,
}

impl std::error::Error for MessageError {}

impl fmt::Display for MessageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidParameters(message) => write!(f, "Invalid parameters: {}", message),
            Self::DatabaseError(message) => write!(f, "Database error: {}", message),
            Self::NotFound => write!(f, "Conversation thread not found"),
            Self::AlreadyExists => write!(f, "Conversation thread already exists"),
        }
    }
}
