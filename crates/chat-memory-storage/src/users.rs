//! Memory-based storage implementation of the UserStorage trait

use async_trait::async_trait;
use chat_storage_traits::SafeEmail;
use chat_storage_traits::users::UserStorage;
use chat_storage_traits::users::error::UserError;
use chat_storage_traits::users::types::*;

use crate::ChatMemoryStorage;

#[async_trait]
impl UserStorage for ChatMemoryStorage {
    async fn find_user(&self, email: &SafeEmail) -> Result<Option<UserRecord>, UserError> {
        self.check_key(email.as_str()).map_err(UserError::InvalidKey)?;
        let inner = self.inner.read();
        Ok(inner.users.get(email).cloned())
    }

    async fn save_user(&self, email: &SafeEmail, record: UserRecord) -> Result<(), UserError> {
        self.check_key(email.as_str()).map_err(UserError::InvalidKey)?;
        let mut inner = self.inner.write();
        inner.users.insert(email.clone(), record);
        Ok(())
    }

    async fn save_user_entry(&self, entry: UserEntry) -> Result<(), UserError> {
        self.check_key(entry.email.as_str())
            .map_err(UserError::InvalidKey)?;
        let mut inner = self.inner.write();
        match inner
            .user_entries
            .iter_mut()
            .find(|existing| existing.email == entry.email)
        {
            Some(existing) => *existing = entry,
            None => inner.user_entries.push(entry),
        }
        Ok(())
    }

    async fn all_users(&self) -> Result<Vec<UserEntry>, UserError> {
        self.stats.record_user_list_read();
        let inner = self.inner.read();
        Ok(inner.user_entries.clone())
    }
}
