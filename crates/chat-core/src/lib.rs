//! Message identity and conversation addressing for a realtime chat client
//!
//! A chat client keeps its users, conversations and messages in a hosted realtime
//! database and its media in an object store. This crate is the layer between the
//! client and those services: it derives every storage key (safe emails, message
//! ids, conversation ids, media object paths) and threads them through the
//! create, append and listen operations the client performs.
//!
//! The services themselves are reached through the traits in
//! [`chat_storage_traits`], so any backend (the in-memory one from
//! `chat-memory-storage`, or a hosted one) can be plugged in.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(rustdoc::bare_urls)]

use std::fmt;
use std::sync::Arc;

use chat_storage_traits::objects::ObjectStorage;
use chat_storage_traits::ChatStorageProvider;

pub mod clock;
pub mod config;
pub mod conversations;
pub mod error;
pub mod logging;
pub mod media;
pub mod message_id;
pub mod prelude;
pub mod session;
#[cfg(test)]
pub mod test_util;
pub mod users;

use self::clock::{Clock, SystemClock};
pub use self::config::ChatConfig;
pub use self::error::Error;
use self::media::MediaGateway;
use self::message_id::new_message_id;
use self::session::Session;
use self::users::UserDirectory;

// Re-export the key types for convenience
pub use chat_storage_traits::{ConversationId, MessageId, SafeEmail};

/// Builder for constructing [`ChatClient`] instances
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
///
/// use chat_core::{ChatClient, ChatConfig};
/// use chat_memory_storage::{ChatMemoryStorage, MemoryObjectStorage};
///
/// let client = ChatClient::builder(
///     Arc::new(ChatMemoryStorage::default()),
///     Arc::new(MemoryObjectStorage::default()),
/// )
/// .with_config(ChatConfig::new())
/// .build();
/// ```
pub struct ChatClientBuilder<Storage> {
    storage: Arc<Storage>,
    objects: Arc<dyn ObjectStorage>,
    config: ChatConfig,
    session: Option<Session>,
    clock: Option<Arc<dyn Clock>>,
}

impl<Storage> ChatClientBuilder<Storage>
where
    Storage: ChatStorageProvider,
{
    /// Create a new builder over the realtime database and object store
    pub fn new(storage: Arc<Storage>, objects: Arc<dyn ObjectStorage>) -> Self {
        Self {
            storage,
            objects,
            config: ChatConfig::default(),
            session: None,
            clock: None,
        }
    }

    /// Set a custom configuration
    pub fn with_config(mut self, config: ChatConfig) -> Self {
        self.config = config;
        self
    }

    /// Start from an existing session instead of a signed out one
    pub fn with_session(mut self, session: Session) -> Self {
        self.session = Some(session);
        self
    }

    /// Use `clock` for message dates instead of the system clock
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Build the client
    pub fn build(self) -> ChatClient<Storage> {
        tracing::debug!(
            backend = ?self.storage.backend(),
            max_media_bytes = self.config.max_media_bytes,
            "building chat client"
        );
        ChatClient {
            media: MediaGateway::new(self.objects, self.config.max_media_bytes),
            storage: self.storage,
            session: self.session.unwrap_or_default(),
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
            users: UserDirectory::new(!self.config.disable_user_cache),
            config: self.config,
        }
    }
}

/// The chat client.
///
/// Holds the backend handles, the local session and the client-side user
/// cache. All backend operations are `async` and resolve exactly once; the
/// client can be shared between tasks behind an `Arc`.
pub struct ChatClient<Storage>
where
    Storage: ChatStorageProvider,
{
    storage: Arc<Storage>,
    media: MediaGateway,
    session: Session,
    clock: Arc<dyn Clock>,
    users: UserDirectory,
    config: ChatConfig,
}

impl<Storage> fmt::Debug for ChatClient<Storage>
where
    Storage: ChatStorageProvider,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatClient")
            .field("backend", &self.storage.backend())
            .field("session", &self.session)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<Storage> ChatClient<Storage>
where
    Storage: ChatStorageProvider,
{
    /// Create a builder for constructing a client
    pub fn builder(
        storage: Arc<Storage>,
        objects: Arc<dyn ObjectStorage>,
    ) -> ChatClientBuilder<Storage> {
        ChatClientBuilder::new(storage, objects)
    }

    /// Construct a client with default configuration and a signed out session
    pub fn new(storage: Arc<Storage>, objects: Arc<dyn ObjectStorage>) -> Self {
        Self::builder(storage, objects).build()
    }

    /// The realtime database
    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    /// The local session
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// The media upload gateway
    pub fn media(&self) -> &MediaGateway {
        &self.media
    }

    /// The active configuration
    pub fn config(&self) -> &ChatConfig {
        &self.config
    }

    /// Id for a new message from the current user to `other_user_email`,
    /// dated now.
    ///
    /// Returns `None` when nobody is signed in.
    pub fn create_message_id(&self, other_user_email: &SafeEmail) -> Option<MessageId> {
        let Some(current) = self.session.safe_email() else {
            tracing::warn!("cannot create a message id without a signed in user");
            return None;
        };
        Some(new_message_id(other_user_email, &current, &self.clock.now()))
    }

    /// Safe email of the signed in user
    pub(crate) fn current_email(&self) -> Result<SafeEmail, Error> {
        self.session.safe_email().ok_or(Error::NotLoggedIn)
    }
}
