//! Chat client errors

use std::io;

use chat_storage_traits::ChatStorageError;
use chat_storage_traits::conversations::error::ConversationError;
use chat_storage_traits::messages::error::MessageError;
use chat_storage_traits::users::error::UserError;

use crate::media::StorageError;

/// Chat client error
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The session has no current user
    #[error("not logged in")]
    NotLoggedIn,
    /// No conversation thread with the given id
    #[error("conversation not found")]
    ConversationNotFound,
    /// No user record under the given email
    #[error("user not found")]
    UserNotFound,
    /// Sign-up with an email that already has a record
    #[error("user already exists")]
    UserExists,
    /// Media upload error
    #[error(transparent)]
    Storage(#[from] StorageError),
    /// User storage error
    #[error(transparent)]
    User(#[from] UserError),
    /// Conversation index error
    #[error(transparent)]
    Conversation(#[from] ConversationError),
    /// Message thread error
    #[error(transparent)]
    Message(#[from] MessageError),
    /// Backend-wide storage error
    #[error(transparent)]
    Backend(#[from] ChatStorageError),
    /// Malformed message date
    #[error(transparent)]
    Date(#[from] chrono::ParseError),
    /// JSON error
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    /// I/O error
    #[error(transparent)]
    Io(#[from] io::Error),
}
