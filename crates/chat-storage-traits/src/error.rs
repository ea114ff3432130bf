//! Error types shared by chat storage backends

use thiserror::Error;

/// Error type for whole-backend operations (snapshots, persistence).
///
/// Per-area operations use the narrower error types in
/// [`crate::users::error`], [`crate::conversations::error`],
/// [`crate::messages::error`] and [`crate::objects::error`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChatStorageError {
    /// Database operation failed
    #[error("database error: {0}")]
    Database(String),

    /// Serialization failed
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Deserialization failed
    #[error("deserialization error: {0}")]
    Deserialization(String),

    /// Requested item was not found
    #[error("not found: {0}")]
    NotFound(String),

    /// Other error
    #[error("error: {0}")]
    Other(String),
}

impl From<serde_json::Error> for ChatStorageError {
    fn from(e: serde_json::Error) -> Self {
        if e.is_data() || e.is_syntax() || e.is_eof() {
            Self::Deserialization(e.to_string())
        } else {
            Self::Serialization(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_storage_error_display() {
        let err = ChatStorageError::Database("connection failed".to_string());
        assert_eq!(err.to_string(), "database error: connection failed");

        let err = ChatStorageError::Serialization("invalid json".to_string());
        assert_eq!(err.to_string(), "serialization error: invalid json");

        let err = ChatStorageError::NotFound("snapshot".to_string());
        assert_eq!(err.to_string(), "not found: snapshot");

        let err = ChatStorageError::Other("unexpected error".to_string());
        assert_eq!(err.to_string(), "error: unexpected error");
    }

    #[test]
    fn test_from_serde_json_syntax_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err = ChatStorageError::from(json_err);
        assert!(matches!(err, ChatStorageError::Deserialization(_)));
    }
}
