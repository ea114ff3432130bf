//! Client configuration, read from `chat_config.json` in the data directory.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Name of the configuration file inside the data directory
pub const CONFIG_FILE_NAME: &str = "chat_config.json";

/// Default upload size limit: 32 MiB
pub const DEFAULT_MAX_MEDIA_BYTES: usize = 32 * 1024 * 1024;

/// Client configuration.
///
/// Every field is optional in the file; missing fields take their default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Largest media upload accepted, in bytes.
    ///
    /// Default: 33554432 (32 MiB)
    pub max_media_bytes: usize,
    /// Base URL of media download links, when the object store is local
    pub media_base_url: Option<String>,
    /// Fetch the user list on every search instead of once
    pub disable_user_cache: bool,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            max_media_bytes: DEFAULT_MAX_MEDIA_BYTES,
            media_base_url: None,
            disable_user_cache: false,
        }
    }
}

impl ChatConfig {
    /// Create a new configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }
}

/// Load `<data_dir>/chat_config.json`.
///
/// A missing or unreadable file gives the default configuration.
pub fn load_config<P>(data_dir: P) -> ChatConfig
where
    P: AsRef<Path>,
{
    let path = data_dir.as_ref().join(CONFIG_FILE_NAME);
    let Ok(bytes) = std::fs::read(&path) else {
        return ChatConfig::default();
    };
    match serde_json::from_slice::<ChatConfig>(&bytes) {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring malformed config");
            ChatConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_config_is_default() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(load_config(dir.path()), ChatConfig::default());
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            r#"{ "disable_user_cache": true }"#,
        )
        .unwrap();

        let config = load_config(dir.path());
        assert!(config.disable_user_cache);
        assert_eq!(config.max_media_bytes, DEFAULT_MAX_MEDIA_BYTES);
        assert_eq!(config.media_base_url, None);
    }

    #[test]
    fn test_malformed_config_is_default() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "max_media_bytes = 1").unwrap();
        assert_eq!(load_config(dir.path()), ChatConfig::default());
    }
}
