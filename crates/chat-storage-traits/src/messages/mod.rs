//! Messages module
//!
//! Conversation threads: the ordered message list stored under each
//! conversation id.

use async_trait::async_trait;
use tokio::sync::watch;

use crate::ConversationId;

pub mod error;
pub mod types;

use self::error::MessageError;
use self::types::*;

/// Storage traits for the messages module
#[async_trait]
pub trait MessageStorage: Send + Sync {
    /// Create a thread holding `first_message`.
    ///
    /// Fails with [`MessageError::AlreadyExists`] if the id is taken.
    async fn create_thread(
        &self,
        conversation_id: &ConversationId,
        first_message: StoredMessage,
    ) -> Result<(), MessageError>;

    /// Append a message to an existing thread.
    ///
    /// Fails with [`MessageError::NotFound`] and writes nothing if the thread
    /// does not exist.
    async fn append_message(
        &self,
        conversation_id: &ConversationId,
        message: StoredMessage,
    ) -> Result<(), MessageError>;

    /// Read the whole thread
    async fn messages(
        &self,
        conversation_id: &ConversationId,
    ) -> Result<Vec<StoredMessage>, MessageError>;

    /// Watch a thread.
    ///
    /// The receiver holds the complete current thread and is notified with the
    /// complete thread again after every change, never with a delta. Changes
    /// made before the receiver reads are coalesced into the newest value.
    async fn subscribe_thread(
        &self,
        conversation_id: &ConversationId,
    ) -> Result<watch::Receiver<Vec<StoredMessage>>, MessageError>;
}
