//! Builders shared by storage tests

use crate::conversations::types::{Conversation, LatestMessage};
use crate::messages::types::StoredMessage;
use crate::users::types::{User, UserEntry};
use crate::{ConversationId, MessageId, SafeEmail};

/// Date string used by test records
pub const TEST_DATE: &str = "Oct 19, 2026 at 3:04:05 PM +00:00";

/// Creates a user with the given first name and email
pub fn create_test_user(first_name: &str, email: &str) -> User {
    User::new(first_name, "Tester", email)
}

/// Creates a user collection entry
pub fn create_test_user_entry(name: &str, email: &str) -> UserEntry {
    UserEntry {
        name: name.to_string(),
        email: SafeEmail::normalize(email),
    }
}

/// Creates a text message sent by `sender_email`
pub fn create_test_stored_message(id: &str, sender_email: &str, text: &str) -> StoredMessage {
    StoredMessage {
        id: MessageId::new(id),
        kind: "text".to_string(),
        content: text.to_string(),
        date: TEST_DATE.to_string(),
        sender_email: SafeEmail::normalize(sender_email),
        name: "Sender".to_string(),
        is_read: false,
    }
}

/// Creates an index entry pointing at `other_email`
pub fn create_test_conversation(id: &str, other_email: &str, text: &str) -> Conversation {
    Conversation {
        id: ConversationId::new(id),
        name: other_email.to_string(),
        other_user_email: SafeEmail::normalize(other_email),
        latest_message: LatestMessage {
            date: TEST_DATE.to_string(),
            text: text.to_string(),
            is_read: false,
        },
    }
}
