//! Conversation repository.
//!
//! A conversation is a message thread stored under its id plus one entry in
//! the conversation index of each participant. The id is derived from the
//! first message: `conversation_<first message id>`. Each index entry
//! describes the *other* participant and carries a summary of the latest
//! message, so both entries are rewritten on every send.
//!
//! Thread and index changes are pushed to subscribers as complete snapshots.

use chat_storage_traits::conversations::types::{Conversation, LatestMessage};
use chat_storage_traits::messages::error::MessageError;
use chat_storage_traits::messages::types::{
    Location, Media, Message, MessageKind, Sender, StoredMessage,
};
use chat_storage_traits::{ChatStorageProvider, ConversationId, SafeEmail};
use tokio::sync::watch;

use crate::media::{photo_message_file_name, video_message_file_name};
use crate::message_id::{message_date_string, new_message_id, parse_message_date};
use crate::{ChatClient, Error};

/// Build the wire record of `message` sent by `sender_email` under `name`
pub fn stored_message(message: &Message, sender_email: &SafeEmail, name: &str) -> StoredMessage {
    StoredMessage {
        id: message.message_id.clone(),
        kind: message.kind.tag().as_str().to_string(),
        content: message.kind.content(),
        date: message_date_string(&message.sent_date),
        sender_email: sender_email.clone(),
        name: name.to_string(),
        is_read: false,
    }
}

/// Rebuild a message from its wire record
pub fn message_from_stored(stored: &StoredMessage) -> Result<Message, Error> {
    Ok(Message {
        sender: Sender {
            sender_id: stored.sender_email.to_string(),
            display_name: stored.name.clone(),
            photo_url: String::new(),
        },
        message_id: stored.id.clone(),
        sent_date: parse_message_date(&stored.date)?,
        kind: MessageKind::from_wire(&stored.kind, &stored.content)?,
    })
}

/// Rebuild a whole thread. Records that cannot be read are skipped.
fn messages_from_stored(thread: &[StoredMessage]) -> Vec<Message> {
    thread
        .iter()
        .filter_map(|stored| match message_from_stored(stored) {
            Ok(message) => Some(message),
            Err(e) => {
                tracing::warn!(message_id = %stored.id, error = %e, "skipping unreadable message");
                None
            }
        })
        .collect()
}

fn clone_conversations(index: &[Conversation]) -> Vec<Conversation> {
    index.to_vec()
}

fn latest_message(stored: &StoredMessage) -> LatestMessage {
    LatestMessage {
        date: stored.date.clone(),
        text: stored.content.clone(),
        is_read: false,
    }
}

fn thread_error(e: MessageError) -> Error {
    match e {
        MessageError::NotFound => Error::ConversationNotFound,
        e => Error::Message(e),
    }
}

/// A push subscription to a backend node.
///
/// The first call to [`SnapshotStream::next`] yields the current value; every
/// later call waits for the next change and yields the complete new value.
/// Changes that land between two calls are coalesced: the next call yields
/// only the newest snapshot, which already contains all of them.
/// Dropping the stream cancels the subscription; subscribing again restarts
/// it from the current value.
pub struct SnapshotStream<R, T> {
    receiver: watch::Receiver<Vec<R>>,
    convert: fn(&[R]) -> Vec<T>,
    started: bool,
}

/// Snapshots of one conversation thread
pub type MessageStream = SnapshotStream<StoredMessage, Message>;

/// Snapshots of the current user's conversation index
pub type ConversationStream = SnapshotStream<Conversation, Conversation>;

impl<R, T> SnapshotStream<R, T> {
    fn new(receiver: watch::Receiver<Vec<R>>, convert: fn(&[R]) -> Vec<T>) -> Self {
        Self {
            receiver,
            convert,
            started: false,
        }
    }

    /// The next snapshot, or `None` once the backend has gone away
    pub async fn next(&mut self) -> Option<Vec<T>> {
        if self.started && self.receiver.changed().await.is_err() {
            return None;
        }
        self.started = true;
        let snapshot = self.receiver.borrow_and_update();
        Some((self.convert)(snapshot.as_slice()))
    }

    /// The latest snapshot, without waiting
    pub fn latest(&self) -> Vec<T> {
        (self.convert)(self.receiver.borrow().as_slice())
    }
}

/// A message that was written to a conversation
#[derive(Debug, Clone, PartialEq)]
pub struct SentMessage {
    /// The conversation the message went to
    pub conversation_id: ConversationId,
    /// The message as written
    pub message: Message,
}

impl<Storage> ChatClient<Storage>
where
    Storage: ChatStorageProvider,
{
    /// Build a message from the current user to `other_user_email`, dated now
    pub fn compose_message(
        &self,
        other_user_email: &SafeEmail,
        kind: MessageKind,
    ) -> Result<Message, Error> {
        let current = self.current_email()?;
        let now = self.clock.now();
        Ok(Message {
            sender: Sender {
                sender_id: current.to_string(),
                display_name: self.session.name().unwrap_or_default(),
                photo_url: String::new(),
            },
            message_id: new_message_id(other_user_email, &current, &now),
            sent_date: now,
            kind,
        })
    }

    /// Start a conversation with `other_user_email` (shown to the current user
    /// as `display_name`) whose first message is `first_message`.
    ///
    /// Writes the thread, then the current user's index entry, then the
    /// recipient's. Starting two conversations with the same user gives two
    /// conversations as long as the first messages have different ids.
    ///
    /// The writes are not rolled back: if a later write fails, the error is
    /// returned and the earlier writes stay in place. A later
    /// [`ChatClient::append_message`] recreates a missing index entry.
    pub async fn create_conversation(
        &self,
        other_user_email: &SafeEmail,
        display_name: &str,
        first_message: &Message,
    ) -> Result<ConversationId, Error> {
        let current = self.current_email()?;
        let Some(record) = self.storage.find_user(&current).await? else {
            tracing::error!(user = %current, "cannot start a conversation for an unknown user");
            return Err(Error::UserNotFound);
        };
        let sender_name = self
            .session
            .name()
            .unwrap_or_else(|| record.display_name());

        let conversation_id = ConversationId::from_first_message(&first_message.message_id);
        let stored = stored_message(first_message, &current, &sender_name);
        let latest = latest_message(&stored);

        self.storage
            .create_thread(&conversation_id, stored)
            .await
            .inspect_err(|e| {
                tracing::error!(conversation_id = %conversation_id, error = %e, "failed to create thread")
            })?;

        self.storage
            .save_conversation(
                &current,
                Conversation {
                    id: conversation_id.clone(),
                    name: display_name.to_string(),
                    other_user_email: other_user_email.clone(),
                    latest_message: latest.clone(),
                },
            )
            .await
            .inspect_err(|e| {
                tracing::error!(conversation_id = %conversation_id, error = %e, "failed to index conversation for sender")
            })?;

        self.storage
            .save_conversation(
                other_user_email,
                Conversation {
                    id: conversation_id.clone(),
                    name: sender_name,
                    other_user_email: current.clone(),
                    latest_message: latest,
                },
            )
            .await
            .inspect_err(|e| {
                tracing::error!(conversation_id = %conversation_id, error = %e, "failed to index conversation for recipient")
            })?;

        tracing::info!(conversation_id = %conversation_id, "created conversation");
        Ok(conversation_id)
    }

    /// Append `message` to an existing conversation with `other_user_email`
    /// and update the latest message in both participants' index entries.
    ///
    /// Fails with [`Error::ConversationNotFound`], writing nothing, if the
    /// thread does not exist. A missing index entry on either side is
    /// recreated.
    pub async fn append_message(
        &self,
        conversation_id: &ConversationId,
        other_user_email: &SafeEmail,
        display_name: &str,
        message: &Message,
    ) -> Result<(), Error> {
        let current = self.current_email()?;
        let sender_name = match self.session.name() {
            Some(name) => name,
            None => self
                .storage
                .find_user(&current)
                .await?
                .map(|record| record.display_name())
                .ok_or(Error::UserNotFound)?,
        };

        let stored = stored_message(message, &current, &sender_name);
        let latest = latest_message(&stored);

        self.storage
            .append_message(conversation_id, stored)
            .await
            .map_err(thread_error)
            .inspect_err(|e| {
                tracing::error!(conversation_id = %conversation_id, error = %e, "failed to append message")
            })?;

        self.update_latest_message(
            &current,
            conversation_id,
            display_name,
            other_user_email,
            &latest,
        )
        .await?;
        self.update_latest_message(
            other_user_email,
            conversation_id,
            &sender_name,
            &current,
            &latest,
        )
        .await?;

        tracing::info!(conversation_id = %conversation_id, message_id = %message.message_id, "appended message");
        Ok(())
    }

    async fn update_latest_message(
        &self,
        owner: &SafeEmail,
        conversation_id: &ConversationId,
        name: &str,
        other_user_email: &SafeEmail,
        latest: &LatestMessage,
    ) -> Result<(), Error> {
        let index = self.storage.conversations(owner).await?;
        let entry = match index.into_iter().find(|entry| &entry.id == conversation_id) {
            Some(mut entry) => {
                entry.latest_message = latest.clone();
                entry
            }
            None => {
                tracing::debug!(owner = %owner, conversation_id = %conversation_id, "recreating missing index entry");
                Conversation {
                    id: conversation_id.clone(),
                    name: name.to_string(),
                    other_user_email: other_user_email.clone(),
                    latest_message: latest.clone(),
                }
            }
        };
        self.storage
            .save_conversation(owner, entry)
            .await
            .inspect_err(|e| {
                tracing::error!(owner = %owner, conversation_id = %conversation_id, error = %e, "failed to update latest message")
            })?;
        Ok(())
    }

    /// Send a message of `kind` to `other_user_email`: appended to
    /// `conversation_id` when given, otherwise as the first message of a new
    /// conversation.
    pub async fn send(
        &self,
        conversation_id: Option<&ConversationId>,
        other_user_email: &SafeEmail,
        display_name: &str,
        kind: MessageKind,
    ) -> Result<SentMessage, Error> {
        let message = self.compose_message(other_user_email, kind)?;
        self.deliver(conversation_id, other_user_email, display_name, message)
            .await
    }

    /// Upload a photo and send it. The object is named after the message id.
    pub async fn send_photo(
        &self,
        conversation_id: Option<&ConversationId>,
        other_user_email: &SafeEmail,
        display_name: &str,
        bytes: Vec<u8>,
    ) -> Result<SentMessage, Error> {
        let mut message = self.compose_message(other_user_email, MessageKind::Text(String::new()))?;
        let file_name = photo_message_file_name(&message.message_id);
        let url = self.media.upload_message_photo(bytes, &file_name).await?;
        message.kind = MessageKind::Photo(Media { url });
        self.deliver(conversation_id, other_user_email, display_name, message)
            .await
    }

    /// Upload the video file at `path` and send it. The object is named after
    /// the message id.
    pub async fn send_video(
        &self,
        conversation_id: Option<&ConversationId>,
        other_user_email: &SafeEmail,
        display_name: &str,
        path: &std::path::Path,
    ) -> Result<SentMessage, Error> {
        let mut message = self.compose_message(other_user_email, MessageKind::Text(String::new()))?;
        let file_name = video_message_file_name(&message.message_id);
        let url = self.media.upload_message_video(path, &file_name).await?;
        message.kind = MessageKind::Video(Media { url });
        self.deliver(conversation_id, other_user_email, display_name, message)
            .await
    }

    /// Send a location
    pub async fn send_location(
        &self,
        conversation_id: Option<&ConversationId>,
        other_user_email: &SafeEmail,
        display_name: &str,
        location: Location,
    ) -> Result<SentMessage, Error> {
        self.send(
            conversation_id,
            other_user_email,
            display_name,
            MessageKind::Location(location),
        )
        .await
    }

    async fn deliver(
        &self,
        conversation_id: Option<&ConversationId>,
        other_user_email: &SafeEmail,
        display_name: &str,
        message: Message,
    ) -> Result<SentMessage, Error> {
        let conversation_id = match conversation_id {
            Some(id) => {
                self.append_message(id, other_user_email, display_name, &message)
                    .await?;
                id.clone()
            }
            None => {
                self.create_conversation(other_user_email, display_name, &message)
                    .await?
            }
        };
        Ok(SentMessage {
            conversation_id,
            message,
        })
    }

    /// Watch a conversation thread.
    ///
    /// Fails with [`Error::ConversationNotFound`] if the thread does not exist.
    pub async fn subscribe(&self, conversation_id: &ConversationId) -> Result<MessageStream, Error> {
        let receiver = self
            .storage
            .subscribe_thread(conversation_id)
            .await
            .map_err(thread_error)?;
        tracing::debug!(conversation_id = %conversation_id, "subscribed to conversation");
        Ok(SnapshotStream::new(receiver, messages_from_stored))
    }

    /// Read a conversation thread once
    pub async fn get_all_messages(
        &self,
        conversation_id: &ConversationId,
    ) -> Result<Vec<Message>, Error> {
        let thread = self
            .storage
            .messages(conversation_id)
            .await
            .map_err(thread_error)?;
        Ok(messages_from_stored(&thread))
    }

    /// Read the current user's conversation index once
    pub async fn get_all_conversations(&self) -> Result<Vec<Conversation>, Error> {
        let current = self.current_email()?;
        Ok(self.storage.conversations(&current).await?)
    }

    /// Watch the current user's conversation index
    pub async fn subscribe_conversations(&self) -> Result<ConversationStream, Error> {
        let current = self.current_email()?;
        let receiver = self.storage.subscribe_conversations(&current).await?;
        Ok(SnapshotStream::new(receiver, clone_conversations))
    }

    /// Find the conversation `target_recipient_email` already has with the
    /// current user, so a new chat can continue it.
    pub async fn conversation_exists(
        &self,
        target_recipient_email: &SafeEmail,
    ) -> Result<Option<ConversationId>, Error> {
        let current = self.current_email()?;
        let index = self.storage.conversations(target_recipient_email).await?;
        Ok(index
            .into_iter()
            .find(|entry| entry.other_user_email == current)
            .map(|entry| entry.id))
    }
}
