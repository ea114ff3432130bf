//! Error types for the users module

use std::fmt;

/// Error types for the users module
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserError {
    /// The key cannot be used by the backend
    InvalidKey(String),
    /// Database error
    DatabaseError(String),
}

impl std::error::Error for UserError {}

impl fmt::Display for UserError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidKey(key) => write!(f, "Invalid user key: {}", key),
            Self::DatabaseError(message) => write!(f, "Database error: {}", message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_error_display() {
        let err = UserError::InvalidKey("a.b".to_string());
        assert_eq!(err.to_string(), "Invalid user key: a.b");

        let err = UserError::DatabaseError("offline".to_string());
        assert_eq!(err.to_string(), "Database error: offline");
    }

    #[test]
    fn test_user_error_is_error() {
        let err: Box<dyn std::error::Error> = Box::new(UserError::DatabaseError("x".to_string()));
        assert!(err.to_string().contains("Database error"));
    }
}
