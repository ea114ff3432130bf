//! Backend-safe user keys derived from email addresses
//!
//! The realtime database rejects key segments that are empty or contain `.`, `#`,
//! `$`, `[`, `]` or `/`. Users are addressed by their email, so every email is
//! normalized before it is used as a key.
//!
//! `.` becomes `-`, which is the encoding all existing records use. The remaining
//! forbidden characters (and `%`, the escape introducer) become percent escapes.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Characters that may never appear in a backend key segment.
pub const FORBIDDEN_KEY_CHARS: [char; 6] = ['.', '#', '$', '[', ']', '/'];

/// Normalizes an email address into a backend key.
///
/// Pure and total: every input, including the empty string, produces a key.
pub fn normalize(email: &str) -> String {
    let mut out = String::with_capacity(email.len());
    for ch in email.chars() {
        match ch {
            '.' => out.push('-'),
            '%' => out.push_str("%25"),
            '#' => out.push_str("%23"),
            '$' => out.push_str("%24"),
            '[' => out.push_str("%5B"),
            ']' => out.push_str("%5D"),
            '/' => out.push_str("%2F"),
            _ => out.push(ch),
        }
    }
    out
}

/// Reverses [`normalize`].
///
/// Exact for every email that contains no `-`; a literal `-` in the original
/// address comes back as `.`.
pub fn denormalize(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut rest = key;
    while let Some(ch) = rest.chars().next() {
        if ch == '-' {
            out.push('.');
            rest = &rest[1..];
            continue;
        }
        if ch == '%'
            && let Some(decoded) = rest.get(1..3).and_then(decode_escape)
        {
            out.push(decoded);
            rest = &rest[3..];
            continue;
        }
        out.push(ch);
        rest = &rest[ch.len_utf8()..];
    }
    out
}

fn decode_escape(hex: &str) -> Option<char> {
    match hex {
        "25" => Some('%'),
        "23" => Some('#'),
        "24" => Some('$'),
        "5B" => Some('['),
        "5D" => Some(']'),
        "2F" => Some('/'),
        _ => None,
    }
}

/// Returns `true` if `key` can be used as a backend key segment.
pub fn is_valid_key(key: &str) -> bool {
    !key.is_empty() && !key.contains(&FORBIDDEN_KEY_CHARS[..])
}

/// A user key: an email address after [`normalize`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SafeEmail(String);

impl SafeEmail {
    /// Normalize a raw email address
    pub fn normalize(email: &str) -> Self {
        Self(normalize(email))
    }

    /// Wrap a key that is already normalized (for example one read back from the backend)
    pub fn from_key<S>(key: S) -> Self
    where
        S: Into<String>,
    {
        Self(key.into())
    }

    /// The key as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Best-effort reconstruction of the original email
    pub fn to_email(&self) -> String {
        denormalize(&self.0)
    }

    /// Check the key against the backend's key constraints
    pub fn is_valid_key(&self) -> bool {
        is_valid_key(&self.0)
    }
}

impl fmt::Display for SafeEmail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SafeEmail {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
