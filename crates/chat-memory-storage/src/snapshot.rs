//! Snapshot and persistence support for memory storage.
//!
//! A snapshot is a complete copy of the data tree. It can be restored into a
//! running storage (subscribers are pushed the restored values) or written to
//! and read from a JSON file, which is how tooling keeps state between runs.
//!
//! # Concurrency
//!
//! `create_snapshot()` holds the read lock while copying and
//! `restore_snapshot()` holds the write lock while replacing, so both are atomic
//! with respect to every other operation.

use std::fs;
use std::path::Path;

use chat_storage_traits::ChatStorageError;
use serde::{Deserialize, Serialize};

use crate::{ChatMemoryStorage, ChatMemoryStorageInner};

/// A point-in-time copy of all memory storage state
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemoryStorageSnapshot {
    pub(crate) tree: ChatMemoryStorageInner,
}

impl MemoryStorageSnapshot {
    /// Number of user records in the snapshot
    pub fn user_count(&self) -> usize {
        self.tree.users.len()
    }

    /// Number of conversation threads in the snapshot
    pub fn thread_count(&self) -> usize {
        self.tree.threads.len()
    }

    /// Serializes the snapshot as pretty-printed JSON
    pub fn to_json(&self) -> Result<String, ChatStorageError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parses a snapshot from JSON
    pub fn from_json(json: &str) -> Result<Self, ChatStorageError> {
        Ok(serde_json::from_str(json)?)
    }
}

impl ChatMemoryStorage {
    /// Creates a snapshot of all in-memory state.
    pub fn create_snapshot(&self) -> MemoryStorageSnapshot {
        let inner = self.inner.read();
        MemoryStorageSnapshot {
            tree: inner.clone(),
        }
    }

    /// Replaces all in-memory state with `snapshot` and pushes the new values
    /// to every subscriber.
    pub fn restore_snapshot(&self, snapshot: MemoryStorageSnapshot) {
        let mut inner = self.inner.write();
        *inner = snapshot.tree;
        self.notify_all(&inner);
    }

    /// Writes a snapshot of the current state to `path` as JSON.
    pub fn save_to_path<P>(&self, path: P) -> Result<(), ChatStorageError>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let json = self.create_snapshot().to_json()?;
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| {
                ChatStorageError::Database(format!("create {}: {e}", parent.display()))
            })?;
        }
        fs::write(path, json)
            .map_err(|e| ChatStorageError::Database(format!("write {}: {e}", path.display())))?;
        tracing::debug!(path = %path.display(), "saved memory storage snapshot");
        Ok(())
    }

    /// Loads storage from a JSON snapshot at `path`.
    ///
    /// A missing file yields empty storage.
    pub fn load_from_path<P>(path: P) -> Result<Self, ChatStorageError>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let storage = Self::new();
        if !path.exists() {
            return Ok(storage);
        }
        let json = fs::read_to_string(path)
            .map_err(|e| ChatStorageError::Database(format!("read {}: {e}", path.display())))?;
        storage.restore_snapshot(MemoryStorageSnapshot::from_json(&json)?);
        Ok(storage)
    }
}
