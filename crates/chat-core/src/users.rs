//! User directory: sign-up, sign-in and the user search behind the
//! new-conversation picker.
//!
//! The user list is read from the backend with a full scan. The first
//! successful read is cached for the life of the client; only
//! [`ChatClient::invalidate_user_cache`] and signing out drop it.

use chat_storage_traits::users::types::{User, UserEntry};
use chat_storage_traits::{ChatStorageProvider, SafeEmail};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::media::profile_picture_file_name;
use crate::{ChatClient, Error};

/// One user offered by [`ChatClient::search_users`]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SearchResult {
    /// Display name
    pub name: String,
    /// Safe email
    pub email: SafeEmail,
}

impl From<UserEntry> for SearchResult {
    fn from(entry: UserEntry) -> Self {
        Self {
            name: entry.name,
            email: entry.email,
        }
    }
}

#[derive(Debug, Default)]
struct UserCache {
    has_fetched: bool,
    users: Vec<UserEntry>,
}

/// Client-side cache of the user collection
#[derive(Debug)]
pub(crate) struct UserDirectory {
    enabled: bool,
    cache: Mutex<UserCache>,
}

impl UserDirectory {
    pub(crate) fn new(enabled: bool) -> Self {
        Self {
            enabled,
            cache: Mutex::new(UserCache::default()),
        }
    }

    fn cached(&self) -> Option<Vec<UserEntry>> {
        let cache = self.cache.lock();
        (self.enabled && cache.has_fetched).then(|| cache.users.clone())
    }

    fn store(&self, users: Vec<UserEntry>) {
        if !self.enabled {
            return;
        }
        let mut cache = self.cache.lock();
        cache.users = users;
        cache.has_fetched = true;
    }

    fn invalidate(&self) {
        *self.cache.lock() = UserCache::default();
    }
}

/// Returns `true` if `query` has nothing but spaces
fn is_blank(query: &str) -> bool {
    query.chars().all(|c| c == ' ')
}

impl<Storage> ChatClient<Storage>
where
    Storage: ChatStorageProvider,
{
    /// Returns `true` if a user record exists for the raw `email`
    pub async fn user_exists(&self, email: &str) -> Result<bool, Error> {
        let safe_email = SafeEmail::normalize(email);
        Ok(self.storage.find_user(&safe_email).await?.is_some())
    }

    /// Write `user`'s record and add it to the user collection
    pub async fn insert_user(&self, user: &User) -> Result<(), Error> {
        let safe_email = user.safe_email();
        self.storage
            .save_user(&safe_email, user.record())
            .await
            .inspect_err(|e| tracing::error!(user = %safe_email, error = %e, "failed to write user"))?;
        self.storage
            .save_user_entry(user.entry())
            .await
            .inspect_err(|e| {
                tracing::error!(user = %safe_email, error = %e, "failed to add user to collection")
            })?;
        tracing::info!(user = %safe_email, "inserted user");
        Ok(())
    }

    /// Register `user` and sign in as that user.
    ///
    /// Fails with [`Error::UserExists`] if the email is taken.
    pub async fn sign_up(&self, user: &User) -> Result<(), Error> {
        if self.user_exists(&user.email_address).await? {
            return Err(Error::UserExists);
        }
        self.insert_user(user).await?;
        self.session
            .sign_in(&user.email_address, &user.display_name());
        Ok(())
    }

    /// Sign in as the user registered under the raw `email`, remembering the
    /// display name stored in the user's record.
    pub async fn sign_in(&self, email: &str) -> Result<(), Error> {
        let safe_email = SafeEmail::normalize(email);
        let Some(record) = self.storage.find_user(&safe_email).await? else {
            tracing::warn!(user = %safe_email, "sign in for unknown user");
            return Err(Error::UserNotFound);
        };
        self.session.sign_in(email, &record.display_name());
        tracing::info!(user = %safe_email, "signed in");
        Ok(())
    }

    /// Forget the current user and drop the user cache
    pub fn sign_out(&self) {
        self.session.sign_out();
        self.users.invalidate();
    }

    /// The whole user collection, read from the backend once and then served
    /// from the cache.
    pub async fn list_users(&self) -> Result<Vec<UserEntry>, Error> {
        if let Some(users) = self.users.cached() {
            return Ok(users);
        }
        let users = self
            .storage
            .all_users()
            .await
            .inspect_err(|e| tracing::error!(error = %e, "failed to fetch users"))?;
        tracing::debug!(count = users.len(), "fetched users");
        self.users.store(users.clone());
        Ok(users)
    }

    /// Users whose name starts with `query`, ignoring case, excluding the
    /// current user.
    ///
    /// A blank query, or no signed in user, gives no results without touching
    /// the backend.
    pub async fn search_users(&self, query: &str) -> Result<Vec<SearchResult>, Error> {
        if is_blank(query) {
            return Ok(Vec::new());
        }
        let Some(current) = self.session.safe_email() else {
            return Ok(Vec::new());
        };

        let prefix = query.to_lowercase();
        let results: Vec<SearchResult> = self
            .list_users()
            .await?
            .into_iter()
            .filter(|entry| entry.email != current)
            .filter(|entry| entry.name.to_lowercase().starts_with(&prefix))
            .map(SearchResult::from)
            .collect();
        tracing::debug!(query, count = results.len(), "searched users");
        Ok(results)
    }

    /// Drop the cached user list so the next search reads the backend again
    pub fn invalidate_user_cache(&self) {
        self.users.invalidate();
    }

    /// Upload the current user's profile picture and return its download URL
    pub async fn upload_profile_picture(&self, bytes: Vec<u8>) -> Result<String, Error> {
        let current = self.current_email()?;
        let file_name = profile_picture_file_name(&current);
        Ok(self.media.upload_profile_picture(bytes, &file_name).await?)
    }
}

#[cfg(test)]
mod tests {
    use chat_storage_traits::users::UserStorage;

    use super::*;
    use crate::test_util::TestBackend;

    #[tokio::test]
    async fn test_insert_user_writes_record_and_entry() {
        let backend = TestBackend::new();
        let client = backend.client();
        let user = User::new("Ada", "Byron", "a.b@x.com");

        assert!(!client.user_exists("a.b@x.com").await.unwrap());
        client.insert_user(&user).await.unwrap();
        assert!(client.user_exists("a.b@x.com").await.unwrap());

        let record = backend
            .storage
            .find_user(&SafeEmail::normalize("a.b@x.com"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.first_name, "Ada");
        assert_eq!(record.last_name, "Byron");

        let entries = backend.storage.all_users().await.unwrap();
        assert_eq!(entries, vec![user.entry()]);
        assert_eq!(entries[0].name, "Ada Byron");
        assert_eq!(entries[0].email.as_str(), "a-b@x-com");
    }

    #[tokio::test]
    async fn test_sign_up_then_sign_in() {
        let backend = TestBackend::new();
        let client = backend.client();
        let user = User::new("Ada", "Byron", "a.b@x.com");

        client.sign_up(&user).await.unwrap();
        assert_eq!(client.session().name().as_deref(), Some("Ada Byron"));
        assert!(matches!(
            client.sign_up(&user).await,
            Err(Error::UserExists)
        ));

        client.sign_out();
        assert!(!client.session().is_signed_in());

        client.sign_in("a.b@x.com").await.unwrap();
        assert_eq!(client.session().email().as_deref(), Some("a.b@x.com"));
        assert_eq!(client.session().name().as_deref(), Some("Ada Byron"));
    }

    #[tokio::test]
    async fn test_sign_in_unknown_user() {
        let backend = TestBackend::new();
        let client = backend.client();
        assert!(matches!(
            client.sign_in("nobody@x.com").await,
            Err(Error::UserNotFound)
        ));
        assert!(!client.session().is_signed_in());
    }

    async fn seeded_backend() -> TestBackend {
        let backend = TestBackend::new();
        let seeder = backend.client();
        for (first, last, email) in [
            ("Ada", "Byron", "a.b@x.com"),
            ("Adam", "Smith", "adam@x.com"),
            ("Bob", "Adams", "bob@x.com"),
            ("adele", "Lower", "adele@x.com"),
        ] {
            seeder
                .insert_user(&User::new(first, last, email))
                .await
                .unwrap();
        }
        backend
    }

    #[tokio::test]
    async fn test_search_by_name_prefix_excludes_current_user() {
        let backend = seeded_backend().await;
        let client = backend.client();
        client.sign_in("a.b@x.com").await.unwrap();

        let results = client.search_users("ad").await.unwrap();
        let names: Vec<&str> = results.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Adam Smith", "adele Lower"]);
        assert_eq!(results[0].email, SafeEmail::normalize("adam@x.com"));
    }

    #[tokio::test]
    async fn test_search_is_case_insensitive() {
        let backend = seeded_backend().await;
        let client = backend.client();
        client.sign_in("bob@x.com").await.unwrap();

        let results = client.search_users("ADA BY").await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].name, "Ada Byron");
    }

    #[tokio::test]
    async fn test_blank_query_does_not_fetch() {
        let backend = seeded_backend().await;
        let client = backend.client();
        client.sign_in("a.b@x.com").await.unwrap();

        assert!(client.search_users("").await.unwrap().is_empty());
        assert!(client.search_users("   ").await.unwrap().is_empty());
        assert_eq!(backend.storage.stats().user_list_reads(), 0);
    }

    #[tokio::test]
    async fn test_search_without_session_is_noop() {
        let backend = seeded_backend().await;
        let client = backend.client();
        assert!(client.search_users("ad").await.unwrap().is_empty());
        assert_eq!(backend.storage.stats().user_list_reads(), 0);
    }

    #[tokio::test]
    async fn test_second_search_reuses_cache() {
        let backend = seeded_backend().await;
        let client = backend.client();
        client.sign_in("a.b@x.com").await.unwrap();

        client.search_users("ad").await.unwrap();
        client.search_users("bo").await.unwrap();
        assert_eq!(backend.storage.stats().user_list_reads(), 1);

        // Users added after the first fetch stay invisible until invalidation
        backend
            .client()
            .insert_user(&User::new("Adrian", "New", "adrian@x.com"))
            .await
            .unwrap();
        assert_eq!(client.search_users("adr").await.unwrap().len(), 0);

        client.invalidate_user_cache();
        assert_eq!(client.search_users("adr").await.unwrap().len(), 1);
        assert_eq!(backend.storage.stats().user_list_reads(), 2);
    }

    #[tokio::test]
    async fn test_disabled_cache_fetches_every_time() {
        let backend = seeded_backend().await;
        let client = backend.client_with_config(crate::ChatConfig {
            disable_user_cache: true,
            ..Default::default()
        });
        client.sign_in("a.b@x.com").await.unwrap();

        client.search_users("ad").await.unwrap();
        client.search_users("ad").await.unwrap();
        assert_eq!(backend.storage.stats().user_list_reads(), 2);
    }

    #[tokio::test]
    async fn test_upload_profile_picture() {
        let backend = TestBackend::new();
        let client = backend.client();
        assert!(matches!(
            client.upload_profile_picture(vec![1]).await,
            Err(Error::NotLoggedIn)
        ));

        client
            .sign_up(&User::new("Ada", "Byron", "a.b@x.com"))
            .await
            .unwrap();
        let url = client.upload_profile_picture(vec![1, 2]).await.unwrap();
        assert!(url.ends_with("/images/a-b%40x-com_profile_picture.png"));
        assert_eq!(
            backend.objects.object("images/a-b@x-com_profile_picture.png"),
            Some(vec![1, 2])
        );
    }
}
