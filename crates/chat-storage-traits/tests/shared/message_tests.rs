//! Conversation thread test functions

use chat_storage_traits::ConversationId;
use chat_storage_traits::messages::MessageStorage;
use chat_storage_traits::messages::error::MessageError;
use chat_storage_traits::test_utils::create_test_stored_message;

/// Test creating a thread and reading it back
pub async fn test_create_and_read_thread<S>(storage: S)
where
    S: MessageStorage,
{
    let id = ConversationId::new("conversation_m1");
    storage
        .create_thread(&id, create_test_stored_message("m1", "a.b@x.com", "hi"))
        .await
        .unwrap();

    let messages = storage.messages(&id).await.unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].content, "hi");
}

/// Test that a thread id can only be created once
pub async fn test_create_thread_twice_fails<S>(storage: S)
where
    S: MessageStorage,
{
    let id = ConversationId::new("conversation_m1");
    storage
        .create_thread(&id, create_test_stored_message("m1", "a.b@x.com", "hi"))
        .await
        .unwrap();

    let result = storage
        .create_thread(&id, create_test_stored_message("m1", "a.b@x.com", "hi"))
        .await;
    assert_eq!(result, Err(MessageError::AlreadyExists));

    // The original thread is untouched
    assert_eq!(storage.messages(&id).await.unwrap().len(), 1);
}

/// Test appending keeps insertion order
pub async fn test_append_message<S>(storage: S)
where
    S: MessageStorage,
{
    let id = ConversationId::new("conversation_m1");
    storage
        .create_thread(&id, create_test_stored_message("m1", "a.b@x.com", "one"))
        .await
        .unwrap();
    storage
        .append_message(&id, create_test_stored_message("m2", "c.d@y.com", "two"))
        .await
        .unwrap();
    storage
        .append_message(&id, create_test_stored_message("m3", "a.b@x.com", "three"))
        .await
        .unwrap();

    let contents: Vec<String> = storage
        .messages(&id)
        .await
        .unwrap()
        .into_iter()
        .map(|m| m.content)
        .collect();
    assert_eq!(contents, vec!["one", "two", "three"]);
}

/// Test that appending to a missing thread fails and creates nothing
pub async fn test_append_to_missing_thread<S>(storage: S)
where
    S: MessageStorage,
{
    let id = ConversationId::new("conversation_missing");
    let result = storage
        .append_message(&id, create_test_stored_message("m1", "a.b@x.com", "hi"))
        .await;
    assert_eq!(result, Err(MessageError::NotFound));
    assert_eq!(storage.messages(&id).await, Err(MessageError::NotFound));
    assert!(storage.subscribe_thread(&id).await.is_err());
}

/// Test that subscribers receive complete snapshots
pub async fn test_subscribe_thread_snapshots<S>(storage: S)
where
    S: MessageStorage,
{
    let id = ConversationId::new("conversation_m1");
    storage
        .create_thread(&id, create_test_stored_message("m1", "a.b@x.com", "one"))
        .await
        .unwrap();

    let mut rx = storage.subscribe_thread(&id).await.unwrap();
    assert_eq!(rx.borrow_and_update().len(), 1);

    storage
        .append_message(&id, create_test_stored_message("m2", "c.d@y.com", "two"))
        .await
        .unwrap();
    rx.changed().await.unwrap();
    let snapshot = rx.borrow_and_update().clone();
    assert_eq!(snapshot.len(), 2);
    assert_eq!(snapshot[0].content, "one");
    assert_eq!(snapshot[1].content, "two");

    // A second subscriber starts from the current snapshot
    let second = storage.subscribe_thread(&id).await.unwrap();
    assert_eq!(second.borrow().len(), 2);
}

/// Test that invalid thread keys are rejected
pub async fn test_invalid_thread_key<S>(storage: S)
where
    S: MessageStorage,
{
    let id = ConversationId::new("conversation_a.b");
    let result = storage
        .create_thread(&id, create_test_stored_message("m1", "a.b@x.com", "hi"))
        .await;
    assert!(matches!(result, Err(MessageError::InvalidParameters(_))));
}
