//! Memory-based storage implementation of the MessageStorage trait

use async_trait::async_trait;
use chat_storage_traits::ConversationId;
use chat_storage_traits::messages::MessageStorage;
use chat_storage_traits::messages::error::MessageError;
use chat_storage_traits::messages::types::*;
use tokio::sync::watch;

use crate::ChatMemoryStorage;

#[async_trait]
impl MessageStorage for ChatMemoryStorage {
    async fn create_thread(
        &self,
        conversation_id: &ConversationId,
        first_message: StoredMessage,
    ) -> Result<(), MessageError> {
        self.check_key(conversation_id.as_str())
            .map_err(MessageError::InvalidParameters)?;

        let mut inner = self.inner.write();
        if inner.threads.contains_key(conversation_id) {
            return Err(MessageError::AlreadyExists);
        }

        let thread = vec![first_message];
        self.notify_thread(conversation_id, &thread);
        inner.threads.insert(conversation_id.clone(), thread);

        tracing::debug!(conversation_id = %conversation_id, "created thread");
        Ok(())
    }

    async fn append_message(
        &self,
        conversation_id: &ConversationId,
        message: StoredMessage,
    ) -> Result<(), MessageError> {
        self.check_key(conversation_id.as_str())
            .map_err(MessageError::InvalidParameters)?;

        let mut inner = self.inner.write();
        let Some(thread) = inner.threads.get_mut(conversation_id) else {
            return Err(MessageError::NotFound);
        };

        if thread.len() >= self.limits.max_messages_per_conversation {
            return Err(MessageError::InvalidParameters(format!(
                "thread {conversation_id} is full ({} messages)",
                thread.len()
            )));
        }

        thread.push(message);
        self.notify_thread(conversation_id, thread);
        Ok(())
    }

    async fn messages(
        &self,
        conversation_id: &ConversationId,
    ) -> Result<Vec<StoredMessage>, MessageError> {
        self.check_key(conversation_id.as_str())
            .map_err(MessageError::InvalidParameters)?;
        self.stats.record_thread_read();
        let inner = self.inner.read();
        inner
            .threads
            .get(conversation_id)
            .cloned()
            .ok_or(MessageError::NotFound)
    }

    async fn subscribe_thread(
        &self,
        conversation_id: &ConversationId,
    ) -> Result<watch::Receiver<Vec<StoredMessage>>, MessageError> {
        self.check_key(conversation_id.as_str())
            .map_err(MessageError::InvalidParameters)?;
        let inner = self.inner.read();
        let current = inner
            .threads
            .get(conversation_id)
            .cloned()
            .ok_or(MessageError::NotFound)?;
        Ok(self.subscribe_thread_node(conversation_id, current))
    }
}
