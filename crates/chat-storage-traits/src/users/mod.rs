//! Users module
//!
//! Every user has a record under its safe email and an entry in the global
//! user collection that backs the new-conversation picker.

use async_trait::async_trait;

use crate::SafeEmail;

pub mod error;
pub mod types;

use self::error::UserError;
use self::types::*;

/// Storage traits for the users module
#[async_trait]
pub trait UserStorage: Send + Sync {
    /// Find the record stored under `email`
    async fn find_user(&self, email: &SafeEmail) -> Result<Option<UserRecord>, UserError>;

    /// Write the record stored under `email`, replacing any previous one
    async fn save_user(&self, email: &SafeEmail, record: UserRecord) -> Result<(), UserError>;

    /// Add an entry to the global user collection.
    ///
    /// An entry with the same email replaces the existing one.
    async fn save_user_entry(&self, entry: UserEntry) -> Result<(), UserError>;

    /// Read the whole user collection
    async fn all_users(&self) -> Result<Vec<UserEntry>, UserError>;
}
