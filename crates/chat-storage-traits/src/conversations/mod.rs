//! Conversations module
//!
//! The conversation index: for each user, the list of conversations the user
//! takes part in, stored under the user's safe email.

use async_trait::async_trait;
use tokio::sync::watch;

use crate::SafeEmail;

pub mod error;
pub mod types;

use self::error::ConversationError;
use self::types::*;

/// Storage traits for the conversations module
#[async_trait]
pub trait ConversationStorage: Send + Sync {
    /// All index entries owned by `owner`, in insertion order.
    ///
    /// A user without conversations has an empty index.
    async fn conversations(&self, owner: &SafeEmail) -> Result<Vec<Conversation>, ConversationError>;

    /// Insert or replace (by id) one entry of `owner`'s index
    async fn save_conversation(
        &self,
        owner: &SafeEmail,
        conversation: Conversation,
    ) -> Result<(), ConversationError>;

    /// Watch `owner`'s index.
    ///
    /// The receiver holds the full current index and is notified with the full
    /// index again after every change. Changes made before the receiver reads
    /// are coalesced into the newest value.
    async fn subscribe_conversations(
        &self,
        owner: &SafeEmail,
    ) -> Result<watch::Receiver<Vec<Conversation>>, ConversationError>;
}
