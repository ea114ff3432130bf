//! Memory-based object store for uploaded media

use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use chat_storage_traits::objects::error::ObjectError;
use chat_storage_traits::objects::{ObjectStorage, is_valid_object_path};
use parking_lot::RwLock;

/// Base URL of download links handed out by [`MemoryObjectStorage::default`].
pub const DEFAULT_MEDIA_BASE_URL: &str = "memory://chat-media";

/// An in-memory object store.
///
/// Failures of either upload phase can be switched on to exercise error paths
/// without a network.
pub struct MemoryObjectStorage {
    base_url: String,
    objects: RwLock<BTreeMap<String, Vec<u8>>>,
    fail_puts: AtomicBool,
    fail_download_urls: AtomicBool,
    put_calls: AtomicUsize,
    download_url_calls: AtomicUsize,
}

impl fmt::Debug for MemoryObjectStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryObjectStorage")
            .field("base_url", &self.base_url)
            .field("objects", &self.objects.read().len())
            .finish()
    }
}

impl Default for MemoryObjectStorage {
    fn default() -> Self {
        Self::new(DEFAULT_MEDIA_BASE_URL)
    }
}

impl MemoryObjectStorage {
    /// Creates an empty store whose download URLs start with `base_url`
    pub fn new<S>(base_url: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            base_url: base_url.into(),
            objects: RwLock::new(BTreeMap::new()),
            fail_puts: AtomicBool::new(false),
            fail_download_urls: AtomicBool::new(false),
            put_calls: AtomicUsize::new(0),
            download_url_calls: AtomicUsize::new(0),
        }
    }

    /// Make every following `put_object` fail (or succeed again)
    pub fn set_fail_puts(&self, fail: bool) {
        self.fail_puts.store(fail, Ordering::SeqCst);
    }

    /// Make every following `download_url` fail (or succeed again)
    pub fn set_fail_download_urls(&self, fail: bool) {
        self.fail_download_urls.store(fail, Ordering::SeqCst);
    }

    /// Number of `put_object` calls so far, failed ones included
    pub fn put_calls(&self) -> usize {
        self.put_calls.load(Ordering::SeqCst)
    }

    /// Number of `download_url` calls so far, failed ones included
    pub fn download_url_calls(&self) -> usize {
        self.download_url_calls.load(Ordering::SeqCst)
    }

    /// The bytes stored at `path`
    pub fn object(&self, path: &str) -> Option<Vec<u8>> {
        self.objects.read().get(path).cloned()
    }

    /// Paths of every stored object, sorted
    pub fn paths(&self) -> Vec<String> {
        self.objects.read().keys().cloned().collect()
    }

    fn url_for(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            encode_path(path)
        )
    }
}

/// Percent-encodes everything but unreserved characters and `/`.
fn encode_path(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    for byte in path.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' | b'/' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

#[async_trait]
impl ObjectStorage for MemoryObjectStorage {
    async fn put_object(&self, path: &str, bytes: Vec<u8>) -> Result<(), ObjectError> {
        self.put_calls.fetch_add(1, Ordering::SeqCst);
        if !is_valid_object_path(path) {
            return Err(ObjectError::InvalidPath(path.to_string()));
        }
        if self.fail_puts.load(Ordering::SeqCst) {
            return Err(ObjectError::Backend(format!("put rejected for {path}")));
        }
        let len = bytes.len();
        self.objects.write().insert(path.to_string(), bytes);
        tracing::debug!(path, len, "stored object");
        Ok(())
    }

    async fn download_url(&self, path: &str) -> Result<String, ObjectError> {
        self.download_url_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_download_urls.load(Ordering::SeqCst) {
            return Err(ObjectError::Backend(format!(
                "download url unavailable for {path}"
            )));
        }
        if !self.objects.read().contains_key(path) {
            return Err(ObjectError::NotFound(path.to_string()));
        }
        Ok(self.url_for(path))
    }
}
