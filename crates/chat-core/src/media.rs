//! Media upload gateway.
//!
//! Uploads go through the object store in two phases: the bytes are written
//! with `put_object`, then a download URL is requested for the same path. The
//! URL is what ends up in photo and video messages. There is no retry; a
//! failed phase ends the upload.

use std::path::Path;
use std::sync::Arc;

use chat_storage_traits::objects::ObjectStorage;
use chat_storage_traits::{MessageId, SafeEmail};

/// Directory of profile pictures
pub const PROFILE_PICTURES_DIR: &str = "images";
/// Directory of photos sent in messages
pub const MESSAGE_IMAGES_DIR: &str = "message_images";
/// Directory of videos sent in messages
pub const MESSAGE_VIDEOS_DIR: &str = "message_videos";

/// Media upload error
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum StorageError {
    /// The bytes could not be read or stored
    #[error("failed to upload")]
    FailedToUpload,
    /// The bytes were stored but no download URL could be resolved
    #[error("failed to get download url")]
    FailedToGetDownloadUrl,
}

/// `<safe email>_profile_picture.png`
pub fn profile_picture_file_name(email: &SafeEmail) -> String {
    format!("{email}_profile_picture.png")
}

/// `photo_message_<message id>.png`, with spaces in the id replaced by `-`
pub fn photo_message_file_name(message_id: &MessageId) -> String {
    format!("photo_message_{}.png", message_id.as_str().replace(' ', "-"))
}

/// `photo_message_<message id>.mov`, with spaces in the id replaced by `-`
pub fn video_message_file_name(message_id: &MessageId) -> String {
    format!("photo_message_{}.mov", message_id.as_str().replace(' ', "-"))
}

/// Object path of a profile picture
pub fn profile_picture_path(file_name: &str) -> String {
    format!("{PROFILE_PICTURES_DIR}/{file_name}")
}

/// Uploads media to the object store and resolves download URLs
#[derive(Clone)]
pub struct MediaGateway {
    objects: Arc<dyn ObjectStorage>,
    max_media_bytes: usize,
}

impl std::fmt::Debug for MediaGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaGateway")
            .field("max_media_bytes", &self.max_media_bytes)
            .finish_non_exhaustive()
    }
}

impl MediaGateway {
    /// Create a gateway over `objects` that rejects uploads above `max_media_bytes`
    pub fn new(objects: Arc<dyn ObjectStorage>, max_media_bytes: usize) -> Self {
        Self {
            objects,
            max_media_bytes,
        }
    }

    /// Upload a profile picture to `images/<file_name>`
    pub async fn upload_profile_picture(
        &self,
        bytes: Vec<u8>,
        file_name: &str,
    ) -> Result<String, StorageError> {
        self.upload(PROFILE_PICTURES_DIR, bytes, file_name).await
    }

    /// Upload a message photo to `message_images/<file_name>`
    pub async fn upload_message_photo(
        &self,
        bytes: Vec<u8>,
        file_name: &str,
    ) -> Result<String, StorageError> {
        self.upload(MESSAGE_IMAGES_DIR, bytes, file_name).await
    }

    /// Read the video at `path` and upload it to `message_videos/<file_name>`
    pub async fn upload_message_video(
        &self,
        path: &Path,
        file_name: &str,
    ) -> Result<String, StorageError> {
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            tracing::error!(path = %path.display(), error = %e, "failed to read video");
            StorageError::FailedToUpload
        })?;
        self.upload(MESSAGE_VIDEOS_DIR, bytes, file_name).await
    }

    /// Resolve the download URL of an already uploaded object
    pub async fn download_url(&self, path: &str) -> Result<String, StorageError> {
        self.objects.download_url(path).await.map_err(|e| {
            tracing::error!(path, error = %e, "failed to get download url");
            StorageError::FailedToGetDownloadUrl
        })
    }

    async fn upload(
        &self,
        dir: &str,
        bytes: Vec<u8>,
        file_name: &str,
    ) -> Result<String, StorageError> {
        let path = format!("{dir}/{file_name}");
        if bytes.len() > self.max_media_bytes {
            tracing::error!(
                path = %path,
                len = bytes.len(),
                limit = self.max_media_bytes,
                "upload too large"
            );
            return Err(StorageError::FailedToUpload);
        }

        self.objects.put_object(&path, bytes).await.map_err(|e| {
            tracing::error!(path = %path, error = %e, "failed to upload");
            StorageError::FailedToUpload
        })?;

        let url = self.download_url(&path).await?;
        tracing::info!(path = %path, url = %url, "upload finished");
        Ok(url)
    }
}
