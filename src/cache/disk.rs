//! Cache store persisting entries to disk
//!
//! Provides a `FileCacheStore` that stores serializable values to JSON files
//! with expiry timestamps, so a feed fetched by one run can be served to the
//! next.

use std::fmt::Write as _;
use std::fs;
use std::io::{self, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use super::CacheStore;

/// Wrapper struct for cached data stored on disk
#[derive(Debug, Serialize, Deserialize)]
struct CacheEntry<T> {
    /// The cached data
    data: T,
    /// When the data was cached
    cached_at: DateTime<Utc>,
    /// When the cache entry expires
    expires_at: DateTime<Utc>,
}

/// Reads and writes cached values as JSON files
///
/// Files live in an XDG-compliant cache directory (`~/.cache/swipefeed/` on
/// Linux), one per key. Unlike an in-memory store, an expired file is deleted
/// when read rather than served stale.
#[derive(Debug)]
pub struct FileCacheStore<V> {
    /// Directory where cache files are stored
    cache_dir: PathBuf,
    _value: PhantomData<fn() -> V>,
}

impl<V> Clone for FileCacheStore<V> {
    fn clone(&self) -> Self {
        Self::with_dir(self.cache_dir.clone())
    }
}

impl<V> FileCacheStore<V> {
    /// Creates a store in the XDG cache directory
    ///
    /// Returns `None` if the cache directory cannot be determined (e.g., no home directory).
    pub fn new() -> Option<Self> {
        Self::default_dir().map(Self::with_dir)
    }

    /// Creates a store rooted at a custom directory
    pub fn with_dir(cache_dir: PathBuf) -> Self {
        Self {
            cache_dir,
            _value: PhantomData,
        }
    }

    /// The XDG cache directory for this application, if one exists
    pub fn default_dir() -> Option<PathBuf> {
        let project_dirs = ProjectDirs::from("", "", "swipefeed")?;
        Some(project_dirs.cache_dir().to_path_buf())
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Returns the path to a cache file for the given key
    ///
    /// Bytes outside `[A-Za-z0-9_-]` are percent-encoded, so distinct keys
    /// always map to distinct files.
    fn cache_path(&self, key: &str) -> PathBuf {
        let mut file_name = String::with_capacity(key.len() + 5);
        for byte in key.bytes() {
            if byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_' {
                file_name.push(byte as char);
            } else {
                let _ = write!(file_name, "%{:02X}", byte);
            }
        }
        file_name.push_str(".json");
        self.cache_dir.join(file_name)
    }

    /// Ensures the cache directory exists
    fn ensure_dir(&self) -> io::Result<()> {
        fs::create_dir_all(&self.cache_dir)
    }

    fn remove_file(&self, key: &str) {
        match fs::remove_file(self.cache_path(key)) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!(key, error = %e, "Failed to remove cache file"),
        }
    }
}

impl<V: Serialize> FileCacheStore<V> {
    fn write(&self, key: &str, data: &V, ttl: Duration) -> io::Result<()> {
        self.ensure_dir()?;

        let now = Utc::now();
        let ttl = chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::MAX);
        let entry = CacheEntry {
            data,
            cached_at: now,
            expires_at: now.checked_add_signed(ttl).unwrap_or(DateTime::<Utc>::MAX_UTC),
        };

        let json = serde_json::to_string_pretty(&entry)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        // Readers must only ever see a complete file: write beside the target,
        // then rename over it.
        let mut file = NamedTempFile::new_in(&self.cache_dir)?;
        file.write_all(json.as_bytes())?;
        file.persist(self.cache_path(key)).map_err(|e| e.error)?;
        Ok(())
    }
}

impl<V> CacheStore<V> for FileCacheStore<V>
where
    V: Serialize + DeserializeOwned,
{
    fn get(&self, key: &str) -> Option<V> {
        let content = fs::read_to_string(self.cache_path(key)).ok()?;
        let entry: CacheEntry<V> = match serde_json::from_str(&content) {
            Ok(entry) => entry,
            Err(e) => {
                debug!(key, error = %e, "Discarding unreadable cache file");
                self.remove_file(key);
                return None;
            }
        };

        if Utc::now() >= entry.expires_at {
            debug!(key, cached_at = %entry.cached_at, "Disk cache entry expired");
            self.remove_file(key);
            return None;
        }

        Some(entry.data)
    }

    fn set(&self, key: &str, value: V, ttl: Duration) {
        if let Err(e) = self.write(key, &value, ttl) {
            warn!(key, dir = %self.cache_dir.display(), error = %e, "Failed to write cache file");
        }
    }

    fn delete(&self, key: &str) {
        self.remove_file(key);
    }
}
