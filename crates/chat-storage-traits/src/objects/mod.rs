//! Objects module
//!
//! The object store that holds uploaded media. Objects are addressed by a
//! slash-separated path such as `message_images/<file name>`.

use async_trait::async_trait;

pub mod error;

use self::error::ObjectError;

/// Storage traits for the objects module
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Store `bytes` at `path`, replacing any previous object
    async fn put_object(&self, path: &str, bytes: Vec<u8>) -> Result<(), ObjectError>;

    /// Resolve a URL the object at `path` can be downloaded from
    async fn download_url(&self, path: &str) -> Result<String, ObjectError>;
}

/// Returns `true` if `path` is a usable object path: non-empty, relative and
/// free of empty or `..` segments.
pub fn is_valid_object_path(path: &str) -> bool {
    !path.is_empty()
        && !path.starts_with('/')
        && path
            .split('/')
            .all(|segment| !segment.is_empty() && segment != "..")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_valid_object_path() {
        assert!(is_valid_object_path("images/a_profile_picture.png"));
        assert!(is_valid_object_path("message_videos/clip.mov"));
        assert!(!is_valid_object_path(""));
        assert!(!is_valid_object_path("/images/a.png"));
        assert!(!is_valid_object_path("images//a.png"));
        assert!(!is_valid_object_path("images/../secrets"));
        assert!(!is_valid_object_path("images/"));
    }
}
