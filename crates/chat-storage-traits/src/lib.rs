//! Chat storage - storage keys, records and async storage traits for the chat addressing layer.
//!
//! The realtime database and the object store that back a chat client are external
//! services. This crate describes the narrow request/response surface the client needs
//! from them, together with the key types (safe emails, conversation ids, message ids)
//! that address every record.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(rustdoc::bare_urls)]

pub mod conversations;
pub mod error;
pub mod ids;
pub mod messages;
pub mod objects;
pub mod safe_email;
#[cfg(feature = "test-utils")]
pub mod test_utils;
pub mod users;

pub use error::ChatStorageError;
pub use ids::{ConversationId, MessageId};
pub use safe_email::SafeEmail;

use self::conversations::ConversationStorage;
use self::messages::MessageStorage;
use self::users::UserStorage;

/// Backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Backend {
    /// Memory
    Memory,
    /// Hosted realtime database
    Realtime,
}

impl Backend {
    /// Check if it's a persistent backend
    ///
    /// All values different from [`Backend::Memory`] are considered persistent
    pub fn is_persistent(&self) -> bool {
        !matches!(self, Self::Memory)
    }
}

/// Storage provider for the chat client.
///
/// Combines the user directory, the per-user conversation index and the
/// conversation threads into one backend handle. Implementors are shared
/// between tasks, so every part must be `Send + Sync`.
pub trait ChatStorageProvider: UserStorage + ConversationStorage + MessageStorage {
    /// Returns the backend type.
    fn backend(&self) -> Backend;
}
