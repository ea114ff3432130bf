//! Local session state.
//!
//! The session is a small key-value store that remembers who is signed in on
//! this device. Two keys are used: [`EMAIL_KEY`] holds the raw email of the
//! current user and [`NAME_KEY`] holds the user's display name. A session
//! without an email is signed out.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use chat_storage_traits::SafeEmail;
use parking_lot::RwLock;

use crate::error::Error;

/// Session key of the current user's raw email
pub const EMAIL_KEY: &str = "email";
/// Session key of the current user's display name
pub const NAME_KEY: &str = "name";

/// Key-value session state.
///
/// Reads are synchronous and never touch the backend.
#[derive(Debug, Default)]
pub struct Session {
    values: RwLock<BTreeMap<String, String>>,
}

impl Session {
    /// Create an empty (signed out) session
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a value
    pub fn get(&self, key: &str) -> Option<String> {
        self.values.read().get(key).cloned()
    }

    /// Write a value
    pub fn set<K, V>(&self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.values.write().insert(key.into(), value.into());
    }

    /// Remove a value
    pub fn remove(&self, key: &str) -> Option<String> {
        self.values.write().remove(key)
    }

    /// Raw email of the current user
    pub fn email(&self) -> Option<String> {
        self.get(EMAIL_KEY)
    }

    /// Display name of the current user
    pub fn name(&self) -> Option<String> {
        self.get(NAME_KEY)
    }

    /// Safe email of the current user
    pub fn safe_email(&self) -> Option<SafeEmail> {
        self.email().map(|email| SafeEmail::normalize(&email))
    }

    /// Returns `true` if a user is signed in
    pub fn is_signed_in(&self) -> bool {
        self.values.read().contains_key(EMAIL_KEY)
    }

    /// Remember `email` and `name` as the current user
    pub fn sign_in(&self, email: &str, name: &str) {
        let mut values = self.values.write();
        values.insert(EMAIL_KEY.to_string(), email.to_string());
        values.insert(NAME_KEY.to_string(), name.to_string());
    }

    /// Forget the current user
    pub fn sign_out(&self) {
        let mut values = self.values.write();
        values.remove(EMAIL_KEY);
        values.remove(NAME_KEY);
    }

    /// Load a session saved with [`Session::save`]. A missing file is a signed
    /// out session.
    pub fn load<P>(path: P) -> Result<Self, Error>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::new());
        }
        let bytes = fs::read(path)?;
        let values: BTreeMap<String, String> = serde_json::from_slice(&bytes)?;
        Ok(Self {
            values: RwLock::new(values),
        })
    }

    /// Write the session to `path` as JSON
    pub fn save<P>(&self, path: P) -> Result<(), Error>
    where
        P: AsRef<Path>,
    {
        let json = serde_json::to_vec_pretty(&*self.values.read())?;
        fs::write(path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_in_and_out() {
        let session = Session::new();
        assert!(!session.is_signed_in());
        assert_eq!(session.safe_email(), None);

        session.sign_in("a.b@x.com", "Ada Byron");
        assert!(session.is_signed_in());
        assert_eq!(session.email().as_deref(), Some("a.b@x.com"));
        assert_eq!(session.name().as_deref(), Some("Ada Byron"));
        assert_eq!(session.safe_email(), Some(SafeEmail::normalize("a.b@x.com")));

        session.sign_out();
        assert!(!session.is_signed_in());
        assert_eq!(session.name(), None);
    }

    #[test]
    fn test_generic_keys() {
        let session = Session::new();
        session.set("theme", "dark");
        assert_eq!(session.get("theme").as_deref(), Some("dark"));
        assert_eq!(session.remove("theme").as_deref(), Some("dark"));
        assert_eq!(session.get("theme"), None);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        let session = Session::new();
        session.sign_in("c.d@y.com", "Cy Dee");
        session.save(&path).unwrap();

        let loaded = Session::load(&path).unwrap();
        assert_eq!(loaded.email().as_deref(), Some("c.d@y.com"));
        assert_eq!(loaded.name().as_deref(), Some("Cy Dee"));
    }

    #[test]
    fn test_load_missing_file_is_signed_out() {
        let dir = tempfile::tempdir().unwrap();
        let session = Session::load(dir.path().join("none.json")).unwrap();
        assert!(!session.is_signed_in());
    }
}
