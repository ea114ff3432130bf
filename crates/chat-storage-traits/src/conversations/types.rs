//! Types for the conversations module

use serde::{Deserialize, Serialize};

use crate::{ConversationId, SafeEmail};

/// One entry of a user's conversation index.
///
/// Each participant owns its own entry for the same conversation, so `name`
/// and `other_user_email` always describe the *other* participant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Conversation {
    /// Conversation id, also the key of the message thread
    pub id: ConversationId,
    /// Display name of the other participant
    pub name: String,
    /// Safe email of the other participant
    pub other_user_email: SafeEmail,
    /// Summary of the newest message
    pub latest_message: LatestMessage,
}

/// Summary of the newest message of a conversation
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LatestMessage {
    /// Formatted send date
    pub date: String,
    /// Message content
    #[serde(rename = "message")]
    pub text: String,
    /// Whether the owner of the entry has read the message
    pub is_read: bool,
}
