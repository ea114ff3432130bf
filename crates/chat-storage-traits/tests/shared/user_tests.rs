//! User storage test functions

use chat_storage_traits::SafeEmail;
use chat_storage_traits::test_utils::{create_test_user, create_test_user_entry};
use chat_storage_traits::users::UserStorage;
use chat_storage_traits::users::error::UserError;

/// Test saving and finding a user record
pub async fn test_save_and_find_user<S>(storage: S)
where
    S: UserStorage,
{
    let user = create_test_user("Ada", "ada.l@example.com");
    let email = user.safe_email();

    assert!(storage.find_user(&email).await.unwrap().is_none());

    storage.save_user(&email, user.record()).await.unwrap();

    let found = storage.find_user(&email).await.unwrap().unwrap();
    assert_eq!(found, user.record());
    assert_eq!(found.display_name(), "Ada Tester");
}

/// Test that records are replaced, not merged
pub async fn test_save_user_replaces_record<S>(storage: S)
where
    S: UserStorage,
{
    let user = create_test_user("Ada", "ada@example.com");
    let email = user.safe_email();
    storage.save_user(&email, user.record()).await.unwrap();

    let renamed = create_test_user("Augusta", "ada@example.com");
    storage.save_user(&email, renamed.record()).await.unwrap();

    let found = storage.find_user(&email).await.unwrap().unwrap();
    assert_eq!(found.first_name, "Augusta");
}

/// Test the global user collection
pub async fn test_user_entries<S>(storage: S)
where
    S: UserStorage,
{
    assert!(storage.all_users().await.unwrap().is_empty());

    storage
        .save_user_entry(create_test_user_entry("Ada Lovelace", "ada@x.com"))
        .await
        .unwrap();
    storage
        .save_user_entry(create_test_user_entry("Bob Stone", "bob@x.com"))
        .await
        .unwrap();

    let users = storage.all_users().await.unwrap();
    assert_eq!(users.len(), 2);
    assert_eq!(users[0].name, "Ada Lovelace");
    assert_eq!(users[1].email, SafeEmail::normalize("bob@x.com"));

    // Same email replaces the existing entry in place
    storage
        .save_user_entry(create_test_user_entry("Ada King", "ada@x.com"))
        .await
        .unwrap();
    let users = storage.all_users().await.unwrap();
    assert_eq!(users.len(), 2);
    assert_eq!(users[0].name, "Ada King");
}

/// Test that keys violating the backend constraints are rejected
pub async fn test_invalid_user_key<S>(storage: S)
where
    S: UserStorage,
{
    let raw = SafeEmail::from_key("not.normalized@x.com");
    let user = create_test_user("Ada", "ada@x.com");
    let result = storage.save_user(&raw, user.record()).await;
    assert!(matches!(result, Err(UserError::InvalidKey(_))));

    let empty = SafeEmail::from_key("");
    assert!(matches!(
        storage.find_user(&empty).await,
        Err(UserError::InvalidKey(_))
    ));
}
