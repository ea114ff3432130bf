//! Chat Public Prelude
//!
//! The types most chat client code works with, in one import.
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use chat_core::prelude::*;
//! use chat_memory_storage::{ChatMemoryStorage, MemoryObjectStorage};
//!
//! let client = ChatClient::new(
//!     Arc::new(ChatMemoryStorage::default()),
//!     Arc::new(MemoryObjectStorage::default()),
//! );
//! assert!(client.create_message_id(&SafeEmail::normalize("c.d@y.com")).is_none());
//! ```

// === Core Types ===
/// Chat client error type
pub use crate::Error;
/// The chat client
pub use crate::{ChatClient, ChatClientBuilder};
/// Client configuration
pub use crate::config::{ChatConfig, load_config};
/// Session state
pub use crate::session::Session;
/// Time sources
pub use crate::clock::{Clock, ManualClock, SystemClock};

// === Result Types ===
/// Conversation operation results
pub use crate::conversations::{ConversationStream, MessageStream, SentMessage};
/// Media upload error
pub use crate::media::StorageError;
/// User search results
pub use crate::users::SearchResult;

// === Keys ===
pub use chat_storage_traits::{ConversationId, MessageId, SafeEmail};

// === Storage Traits (users need these to provide storage implementations) ===
pub use chat_storage_traits::objects::ObjectStorage;
pub use chat_storage_traits::{Backend, ChatStorageProvider};

// === Storage Type Aliases ===
pub use chat_storage_traits::conversations::types as conversation_types;
pub use chat_storage_traits::messages::types as message_types;
pub use chat_storage_traits::users::types as user_types;
