//! Memory-based storage implementation of the ConversationStorage trait

use async_trait::async_trait;
use chat_storage_traits::SafeEmail;
use chat_storage_traits::conversations::ConversationStorage;
use chat_storage_traits::conversations::error::ConversationError;
use chat_storage_traits::conversations::types::*;
use tokio::sync::watch;

use crate::ChatMemoryStorage;

#[async_trait]
impl ConversationStorage for ChatMemoryStorage {
    async fn conversations(&self, owner: &SafeEmail) -> Result<Vec<Conversation>, ConversationError> {
        self.check_key(owner.as_str())
            .map_err(ConversationError::InvalidKey)?;
        self.stats.record_index_read();
        let inner = self.inner.read();
        Ok(inner.conversations.get(owner).cloned().unwrap_or_default())
    }

    async fn save_conversation(
        &self,
        owner: &SafeEmail,
        conversation: Conversation,
    ) -> Result<(), ConversationError> {
        self.check_key(owner.as_str())
            .map_err(ConversationError::InvalidKey)?;
        self.check_key(conversation.id.as_str())
            .map_err(ConversationError::InvalidKey)?;

        let mut inner = self.inner.write();
        let index = inner.conversations.entry(owner.clone()).or_default();

        match index.iter_mut().find(|existing| existing.id == conversation.id) {
            Some(existing) => *existing = conversation,
            None => {
                if index.len() >= self.limits.max_conversations_per_user {
                    return Err(ConversationError::Database(format!(
                        "conversation index of {owner} is full ({} entries)",
                        index.len()
                    )));
                }
                index.push(conversation);
            }
        }

        self.notify_conversations(owner, index);
        Ok(())
    }

    async fn subscribe_conversations(
        &self,
        owner: &SafeEmail,
    ) -> Result<watch::Receiver<Vec<Conversation>>, ConversationError> {
        self.check_key(owner.as_str())
            .map_err(ConversationError::InvalidKey)?;
        let inner = self.inner.read();
        let current = inner.conversations.get(owner).cloned().unwrap_or_default();
        Ok(self.subscribe_conversations_node(owner, current))
    }
}

#[cfg(test)]
mod tests {
    use chat_storage_traits::test_utils::create_test_conversation;

    use super::*;
    use crate::ValidationLimits;

    #[tokio::test]
    async fn test_index_limit() {
        let storage =
            ChatMemoryStorage::with_limits(ValidationLimits::new().with_max_conversations_per_user(1));
        let owner = SafeEmail::normalize("a@x.com");

        storage
            .save_conversation(&owner, create_test_conversation("conversation_1", "b@x.com", "hi"))
            .await
            .unwrap();
        let result = storage
            .save_conversation(&owner, create_test_conversation("conversation_2", "c@x.com", "hi"))
            .await;
        assert!(matches!(result, Err(ConversationError::Database(_))));

        // Replacing an existing entry is still allowed at the limit
        storage
            .save_conversation(&owner, create_test_conversation("conversation_1", "b@x.com", "yo"))
            .await
            .unwrap();
        let index = storage.conversations(&owner).await.unwrap();
        assert_eq!(index.len(), 1);
        assert_eq!(index[0].latest_message.text, "yo");
    }

    #[tokio::test]
    async fn test_subscribers_of_other_owners_are_not_notified() {
        let storage = ChatMemoryStorage::default();
        let a = SafeEmail::normalize("a@x.com");
        let b = SafeEmail::normalize("b@x.com");
        let mut rx_b = storage.subscribe_conversations(&b).await.unwrap();
        rx_b.borrow_and_update();

        storage
            .save_conversation(&a, create_test_conversation("conversation_1", "b@x.com", "hi"))
            .await
            .unwrap();

        assert!(!rx_b.has_changed().unwrap());
    }
}
