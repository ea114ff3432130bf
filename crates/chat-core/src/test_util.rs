//! Test utilities for the chat-core crate
//!
//! Every test client talks to the same in-memory backend and reads the same
//! manual clock, so tests can play several users against each other.

use std::sync::Arc;

use chat_memory_storage::{ChatMemoryStorage, MemoryObjectStorage, ValidationLimits};
use chat_storage_traits::users::types::User;
use chrono::{DateTime, FixedOffset, TimeZone};

use crate::clock::ManualClock;
use crate::{ChatClient, ChatConfig};

/// Base URL of download links in tests
pub const TEST_MEDIA_BASE_URL: &str = "https://media.test";

/// `Oct 19, 2026 at 3:04:05 PM +02:00`, where every test clock starts
pub fn test_now() -> DateTime<FixedOffset> {
    FixedOffset::east_opt(2 * 3600)
        .and_then(|tz| tz.with_ymd_and_hms(2026, 10, 19, 15, 4, 5).single())
        .expect("valid test date")
}

/// A shared in-memory backend and clock
pub struct TestBackend {
    /// The realtime database
    pub storage: Arc<ChatMemoryStorage>,
    /// The object store
    pub objects: Arc<MemoryObjectStorage>,
    /// The clock every client reads
    pub clock: Arc<ManualClock>,
}

impl Default for TestBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl TestBackend {
    /// Creates an empty backend with the clock at [`test_now`]
    pub fn new() -> Self {
        Self::with_limits(ValidationLimits::default())
    }

    /// Creates an empty backend that enforces `limits`
    pub fn with_limits(limits: ValidationLimits) -> Self {
        Self {
            storage: Arc::new(ChatMemoryStorage::with_limits(limits)),
            objects: Arc::new(MemoryObjectStorage::new(TEST_MEDIA_BASE_URL)),
            clock: Arc::new(ManualClock::new(test_now())),
        }
    }

    /// A signed out client with default configuration
    pub fn client(&self) -> ChatClient<ChatMemoryStorage> {
        self.client_with_config(ChatConfig::default())
    }

    /// A signed out client with `config`
    pub fn client_with_config(&self, config: ChatConfig) -> ChatClient<ChatMemoryStorage> {
        ChatClient::builder(self.storage.clone(), self.objects.clone())
            .with_config(config)
            .with_clock(self.clock.clone())
            .build()
    }

    /// A client signed in as a freshly registered user
    pub async fn signed_up_client(
        &self,
        first_name: &str,
        last_name: &str,
        email: &str,
    ) -> ChatClient<ChatMemoryStorage> {
        let client = self.client();
        client
            .sign_up(&User::new(first_name, last_name, email))
            .await
            .expect("Failed to sign up test user");
        client
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_clients_share_backend() {
        let backend = TestBackend::new();
        let ada = backend.signed_up_client("Ada", "Byron", "a.b@x.com").await;
        let other = backend.client();
        assert!(other.user_exists("a.b@x.com").await.unwrap());
        assert!(ada.session().is_signed_in());
        assert!(!other.session().is_signed_in());
    }
}
