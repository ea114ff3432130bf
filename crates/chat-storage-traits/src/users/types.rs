//! Types for the users module

use serde::{Deserialize, Serialize};

use crate::SafeEmail;

/// A chat user as entered at sign-up
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct User {
    /// First name
    pub first_name: String,
    /// Last name
    pub last_name: String,
    /// Raw email address
    pub email_address: String,
}

impl User {
    /// Create a new user
    pub fn new<F, L, E>(first_name: F, last_name: L, email_address: E) -> Self
    where
        F: Into<String>,
        L: Into<String>,
        E: Into<String>,
    {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            email_address: email_address.into(),
        }
    }

    /// The backend key of this user
    pub fn safe_email(&self) -> SafeEmail {
        SafeEmail::normalize(&self.email_address)
    }

    /// `"<first> <last>"`, the name shown to other users
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// The record stored under [`User::safe_email`]
    pub fn record(&self) -> UserRecord {
        UserRecord {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
        }
    }

    /// The entry appended to the global user collection
    pub fn entry(&self) -> UserEntry {
        UserEntry {
            name: self.display_name(),
            email: self.safe_email(),
        }
    }
}

/// The record stored under a user's safe email
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserRecord {
    /// First name
    pub first_name: String,
    /// Last name
    pub last_name: String,
}

impl UserRecord {
    /// `"<first> <last>"`
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// One element of the global user collection
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserEntry {
    /// Display name
    pub name: String,
    /// Safe email of the user
    pub email: SafeEmail,
}
