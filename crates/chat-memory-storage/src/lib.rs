//! Memory-based storage implementation for the chat client.
//!
//! This crate provides an in-memory stand-in for the two hosted services a chat
//! client talks to: the realtime database ([`ChatMemoryStorage`]) and the media
//! object store ([`MemoryObjectStorage`]).
//!
//! Memory-based storage is non-persistent unless a snapshot is written out with
//! [`ChatMemoryStorage::save_to_path`]. It's useful for tests, local tooling and
//! ephemeral sessions.
//!
//! ## Key validation
//!
//! Like the hosted database, every key segment is validated: empty keys and keys
//! containing `.`, `#`, `$`, `[`, `]` or `/` are rejected with an error instead of
//! being written.
//!
//! ## Push subscriptions
//!
//! Subscribers get a `tokio::sync::watch` receiver that always holds the complete
//! current value of the watched node (a conversation thread or a user's
//! conversation index) and is notified after every write to it.
//!
//! ## Customizing Limits
//!
//! ```rust
//! use chat_memory_storage::{ChatMemoryStorage, ValidationLimits};
//!
//! let limits = ValidationLimits::default()
//!     .with_max_messages_per_conversation(5000)
//!     .with_max_key_length(256);
//!
//! let storage = ChatMemoryStorage::with_limits(limits);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(rustdoc::bare_urls)]

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

use chat_storage_traits::conversations::types::Conversation;
use chat_storage_traits::messages::types::StoredMessage;
use chat_storage_traits::safe_email::is_valid_key;
use chat_storage_traits::users::types::{UserEntry, UserRecord};
use chat_storage_traits::{Backend, ChatStorageProvider, ConversationId, SafeEmail};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

mod conversations;
mod messages;
mod objects;
mod snapshot;
mod users;

pub use self::objects::{DEFAULT_MEDIA_BASE_URL, MemoryObjectStorage};
pub use self::snapshot::MemoryStorageSnapshot;

/// Default maximum number of messages in one conversation thread.
pub const DEFAULT_MAX_MESSAGES_PER_CONVERSATION: usize = 10000;

/// Default maximum number of entries in one user's conversation index.
pub const DEFAULT_MAX_CONVERSATIONS_PER_USER: usize = 10000;

/// Default maximum length of a key segment in bytes, matching the hosted database.
pub const DEFAULT_MAX_KEY_LENGTH: usize = 768;

/// Configurable validation limits for memory storage.
///
/// All limits have defaults that can be overridden using the builder pattern.
#[derive(Debug, Clone, Copy)]
pub struct ValidationLimits {
    /// Maximum number of messages in one thread
    pub max_messages_per_conversation: usize,
    /// Maximum number of index entries per user
    pub max_conversations_per_user: usize,
    /// Maximum length of a key segment in bytes
    pub max_key_length: usize,
}

impl Default for ValidationLimits {
    fn default() -> Self {
        Self {
            max_messages_per_conversation: DEFAULT_MAX_MESSAGES_PER_CONVERSATION,
            max_conversations_per_user: DEFAULT_MAX_CONVERSATIONS_PER_USER,
            max_key_length: DEFAULT_MAX_KEY_LENGTH,
        }
    }
}

impl ValidationLimits {
    /// Creates a new `ValidationLimits` with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum number of messages in one thread.
    ///
    /// # Panics
    ///
    /// Panics if `limit` is 0.
    pub fn with_max_messages_per_conversation(mut self, limit: usize) -> Self {
        assert!(
            limit > 0,
            "max_messages_per_conversation must be greater than 0"
        );
        self.max_messages_per_conversation = limit;
        self
    }

    /// Sets the maximum number of index entries per user.
    ///
    /// # Panics
    ///
    /// Panics if `limit` is 0.
    pub fn with_max_conversations_per_user(mut self, limit: usize) -> Self {
        assert!(limit > 0, "max_conversations_per_user must be greater than 0");
        self.max_conversations_per_user = limit;
        self
    }

    /// Sets the maximum length of a key segment in bytes.
    ///
    /// # Panics
    ///
    /// Panics if `limit` is 0.
    pub fn with_max_key_length(mut self, limit: usize) -> Self {
        assert!(limit > 0, "max_key_length must be greater than 0");
        self.max_key_length = limit;
        self
    }
}

/// Counters of backend reads, for observing client-side caching.
#[derive(Debug, Default)]
pub struct MemoryStorageStats {
    user_list_reads: AtomicUsize,
    thread_reads: AtomicUsize,
    index_reads: AtomicUsize,
}

impl MemoryStorageStats {
    /// Number of full reads of the user collection
    pub fn user_list_reads(&self) -> usize {
        self.user_list_reads.load(Ordering::SeqCst)
    }

    /// Number of one-shot thread reads
    pub fn thread_reads(&self) -> usize {
        self.thread_reads.load(Ordering::SeqCst)
    }

    /// Number of one-shot conversation index reads
    pub fn index_reads(&self) -> usize {
        self.index_reads.load(Ordering::SeqCst)
    }

    pub(crate) fn record_user_list_read(&self) {
        self.user_list_reads.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn record_thread_read(&self) {
        self.thread_reads.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn record_index_read(&self) {
        self.index_reads.fetch_add(1, Ordering::SeqCst);
    }
}

/// A memory-based realtime database for the chat client.
///
/// ## Thread Safety
///
/// The data tree sits behind a single `RwLock`, so reads run concurrently and
/// every write is exclusive. Watch senders live behind a separate `Mutex` that is
/// always taken after the data lock.
pub struct ChatMemoryStorage {
    /// Configurable validation limits
    limits: ValidationLimits,
    /// The data tree
    inner: RwLock<ChatMemoryStorageInner>,
    /// Push channels for subscribed nodes
    watchers: Mutex<Watchers>,
    /// Read counters
    stats: MemoryStorageStats,
}

/// The data tree, laid out the way the hosted database stores it
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub(crate) struct ChatMemoryStorageInner {
    /// `<safe email>` user records
    pub(crate) users: BTreeMap<SafeEmail, UserRecord>,
    /// The `users` collection
    pub(crate) user_entries: Vec<UserEntry>,
    /// `<safe email>/conversations`
    pub(crate) conversations: BTreeMap<SafeEmail, Vec<Conversation>>,
    /// `<conversation id>/messages`
    pub(crate) threads: BTreeMap<ConversationId, Vec<StoredMessage>>,
}

#[derive(Default)]
struct Watchers {
    threads: HashMap<ConversationId, watch::Sender<Vec<StoredMessage>>>,
    conversations: HashMap<SafeEmail, watch::Sender<Vec<Conversation>>>,
}

impl fmt::Debug for ChatMemoryStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatMemoryStorage")
            .field("limits", &self.limits)
            .field("inner", &"RwLock<ChatMemoryStorageInner>")
            .finish()
    }
}

impl Default for ChatMemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatMemoryStorage {
    /// Creates a new, empty `ChatMemoryStorage` with default limits.
    pub fn new() -> Self {
        Self::with_limits(ValidationLimits::default())
    }

    /// Creates a new, empty `ChatMemoryStorage` with the provided validation limits.
    pub fn with_limits(limits: ValidationLimits) -> Self {
        Self {
            limits,
            inner: RwLock::new(ChatMemoryStorageInner::default()),
            watchers: Mutex::new(Watchers::default()),
            stats: MemoryStorageStats::default(),
        }
    }

    /// Returns the current validation limits.
    pub fn limits(&self) -> &ValidationLimits {
        &self.limits
    }

    /// Returns the read counters.
    pub fn stats(&self) -> &MemoryStorageStats {
        &self.stats
    }

    /// Validates one key segment against the backend's constraints.
    pub(crate) fn check_key(&self, key: &str) -> Result<(), String> {
        if !is_valid_key(key) {
            return Err(format!(
                "'{key}' must be non-empty and must not contain '.', '#', '$', '[', ']' or '/'"
            ));
        }
        if key.len() > self.limits.max_key_length {
            return Err(format!(
                "key is {} bytes, limit is {}",
                key.len(),
                self.limits.max_key_length
            ));
        }
        Ok(())
    }

    /// Pushes the current thread to its subscribers, if any.
    fn notify_thread(&self, conversation_id: &ConversationId, messages: &[StoredMessage]) {
        let watchers = self.watchers.lock();
        if let Some(sender) = watchers.threads.get(conversation_id) {
            sender.send_replace(messages.to_vec());
        }
    }

    /// Pushes the current index of `owner` to its subscribers, if any.
    fn notify_conversations(&self, owner: &SafeEmail, conversations: &[Conversation]) {
        let watchers = self.watchers.lock();
        if let Some(sender) = watchers.conversations.get(owner) {
            sender.send_replace(conversations.to_vec());
        }
    }

    fn subscribe_thread_node(
        &self,
        conversation_id: &ConversationId,
        current: Vec<StoredMessage>,
    ) -> watch::Receiver<Vec<StoredMessage>> {
        let mut watchers = self.watchers.lock();
        watchers
            .threads
            .entry(conversation_id.clone())
            .or_insert_with(|| watch::channel(current).0)
            .subscribe()
    }

    fn subscribe_conversations_node(
        &self,
        owner: &SafeEmail,
        current: Vec<Conversation>,
    ) -> watch::Receiver<Vec<Conversation>> {
        let mut watchers = self.watchers.lock();
        watchers
            .conversations
            .entry(owner.clone())
            .or_insert_with(|| watch::channel(current).0)
            .subscribe()
    }

    /// Pushes every watched node after the whole tree was replaced.
    fn notify_all(&self, inner: &ChatMemoryStorageInner) {
        let watchers = self.watchers.lock();
        for (conversation_id, sender) in &watchers.threads {
            let messages = inner
                .threads
                .get(conversation_id)
                .cloned()
                .unwrap_or_default();
            sender.send_replace(messages);
        }
        for (owner, sender) in &watchers.conversations {
            let conversations = inner.conversations.get(owner).cloned().unwrap_or_default();
            sender.send_replace(conversations);
        }
    }
}

impl ChatStorageProvider for ChatMemoryStorage {
    fn backend(&self) -> Backend {
        Backend::Memory
    }
}
