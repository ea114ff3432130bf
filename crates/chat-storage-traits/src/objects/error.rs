//! Error types for the objects module

use thiserror::Error;

/// Error types for the objects module
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ObjectError {
    /// The object path cannot be used
    #[error("invalid object path: {0}")]
    InvalidPath(String),
    /// No object is stored at the path
    #[error("object not found: {0}")]
    NotFound(String),
    /// The storage service rejected the request
    #[error("object storage error: {0}")]
    Backend(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_error_display() {
        assert_eq!(
            ObjectError::InvalidPath("/x".to_string()).to_string(),
            "invalid object path: /x"
        );
        assert_eq!(
            ObjectError::NotFound("images/a.png".to_string()).to_string(),
            "object not found: images/a.png"
        );
        assert_eq!(
            ObjectError::Backend("quota".to_string()).to_string(),
            "object storage error: quota"
        );
    }
}
