//! Conversation index test functions

use chat_storage_traits::SafeEmail;
use chat_storage_traits::conversations::ConversationStorage;
use chat_storage_traits::conversations::error::ConversationError;
use chat_storage_traits::test_utils::create_test_conversation;

/// Test that an unknown owner has an empty index
pub async fn test_empty_index<S>(storage: S)
where
    S: ConversationStorage,
{
    let owner = SafeEmail::normalize("nobody@x.com");
    assert!(storage.conversations(&owner).await.unwrap().is_empty());
}

/// Test inserting and replacing index entries
pub async fn test_save_conversation_upserts_by_id<S>(storage: S)
where
    S: ConversationStorage,
{
    let owner = SafeEmail::normalize("a.b@x.com");

    storage
        .save_conversation(&owner, create_test_conversation("conversation_1", "c.d@y.com", "hi"))
        .await
        .unwrap();
    storage
        .save_conversation(&owner, create_test_conversation("conversation_2", "e.f@z.com", "yo"))
        .await
        .unwrap();

    let index = storage.conversations(&owner).await.unwrap();
    assert_eq!(index.len(), 2);
    assert_eq!(index[0].id.as_str(), "conversation_1");
    assert_eq!(index[1].id.as_str(), "conversation_2");

    storage
        .save_conversation(
            &owner,
            create_test_conversation("conversation_1", "c.d@y.com", "again"),
        )
        .await
        .unwrap();

    let index = storage.conversations(&owner).await.unwrap();
    assert_eq!(index.len(), 2);
    assert_eq!(index[0].latest_message.text, "again");

    // Other owners are unaffected
    let other = SafeEmail::normalize("c.d@y.com");
    assert!(storage.conversations(&other).await.unwrap().is_empty());
}

/// Test that subscribers receive the full index on every change
pub async fn test_subscribe_conversations<S>(storage: S)
where
    S: ConversationStorage,
{
    let owner = SafeEmail::normalize("a.b@x.com");
    let mut rx = storage.subscribe_conversations(&owner).await.unwrap();
    assert!(rx.borrow_and_update().is_empty());

    storage
        .save_conversation(&owner, create_test_conversation("conversation_1", "c.d@y.com", "hi"))
        .await
        .unwrap();
    rx.changed().await.unwrap();
    assert_eq!(rx.borrow_and_update().len(), 1);

    storage
        .save_conversation(&owner, create_test_conversation("conversation_2", "e.f@z.com", "yo"))
        .await
        .unwrap();
    rx.changed().await.unwrap();
    let index = rx.borrow_and_update().clone();
    assert_eq!(index.len(), 2);
}

/// Test that keys violating the backend constraints are rejected
pub async fn test_invalid_owner_key<S>(storage: S)
where
    S: ConversationStorage,
{
    let owner = SafeEmail::from_key("a.b@x.com");
    let result = storage
        .save_conversation(&owner, create_test_conversation("conversation_1", "c.d@y.com", "hi"))
        .await;
    assert!(matches!(result, Err(ConversationError::InvalidKey(_))));
}
