//! Runtime configuration for the feed pipeline
//!
//! Values come from command-line flags with environment fallbacks; see
//! [`crate::cli`] for how a [`FeedConfig`] is assembled and validated.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::feed::DEFAULT_CACHE_TTL;

/// Default AT Protocol service (PDS entryway)
pub const DEFAULT_SERVICE_URL: &str = "https://bsky.social";

/// Timeline entries requested per fetch
pub const DEFAULT_PAGE_SIZE: u8 = 20;

/// Largest page the timeline endpoint accepts
pub const MAX_PAGE_SIZE: u8 = 100;

/// Upper bound on a single upstream request
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Login credentials for the upstream account
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Handle, DID or email used to log in
    pub identifier: String,
    /// Account or app password
    pub password: String,
}

impl Credentials {
    pub fn new(identifier: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            password: password.into(),
        }
    }
}

// Keeps the password out of logs
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("identifier", &self.identifier)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Where normalized feeds are cached
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheBackend {
    /// JSON files in the given directory, shared across runs
    Disk(PathBuf),
    /// Process memory only
    Memory,
}

/// Everything needed to build a feed service
#[derive(Debug, Clone)]
pub struct FeedConfig {
    pub service_url: String,
    /// Required by commands that reach the upstream
    pub credentials: Option<Credentials>,
    pub page_size: u8,
    pub cache_ttl: Duration,
    pub request_timeout: Duration,
    pub cache: CacheBackend,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            service_url: DEFAULT_SERVICE_URL.to_string(),
            credentials: None,
            page_size: DEFAULT_PAGE_SIZE,
            cache_ttl: DEFAULT_CACHE_TTL,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            cache: CacheBackend::Memory,
        }
    }
}
