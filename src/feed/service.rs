//! Cache-first feed retrieval
//!
//! [`FeedService`] owns the caching policy: one fixed key, one TTL. It never
//! reaches into store internals and never retries a failed fetch.

use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info, warn};

use super::{FeedItem, FeedSource, SourceError};
use crate::cache::CacheStore;

/// Key under which the current feed snapshot is cached
pub const FEED_CACHE_KEY: &str = "feed_cache";

/// How long a fetched feed is served from cache (5 minutes)
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(5 * 60);

/// Errors surfaced by [`FeedService`]
#[derive(Debug, Error)]
pub enum FeedError {
    /// The source could not produce a feed; the cache was left untouched
    #[error("Failed to load feed: {0}")]
    LoadFailed(#[source] SourceError),
}

/// Serves the normalized feed from a [`FeedSource`] through a [`CacheStore`]
#[derive(Debug)]
pub struct FeedService<S, C> {
    source: S,
    cache: C,
    ttl: Duration,
}

impl<S, C> FeedService<S, C>
where
    S: FeedSource,
    C: CacheStore<Vec<FeedItem>>,
{
    /// Creates a service with the default 5 minute TTL
    pub fn new(source: S, cache: C) -> Self {
        Self::with_ttl(source, cache, DEFAULT_CACHE_TTL)
    }

    pub fn with_ttl(source: S, cache: C, ttl: Duration) -> Self {
        Self { source, cache, ttl }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    /// Returns the current feed, fetching only on a cache miss
    ///
    /// # Behavior
    /// - A cached snapshot is returned as-is, without touching the source
    /// - On a miss, raw entries are fetched and normalized; entries the source
    ///   can't display are dropped and the rest keep their upstream order
    /// - The result is cached even when empty
    /// - A fetch failure returns [`FeedError::LoadFailed`] and writes nothing
    pub async fn get_feed(&self) -> Result<Vec<FeedItem>, FeedError> {
        if let Some(cached) = self.cache.get(FEED_CACHE_KEY) {
            debug!(items = cached.len(), "Serving feed from cache");
            return Ok(cached);
        }

        debug!("Feed cache miss, fetching from source");
        let raw = match self.source.fetch_feed().await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "Failed to fetch feed");
                return Err(FeedError::LoadFailed(e));
            }
        };

        let fetched = raw.len();
        let items: Vec<FeedItem> = raw
            .iter()
            .filter_map(|entry| self.source.process_feed_item(entry))
            .collect();

        info!(
            fetched,
            kept = items.len(),
            dropped = fetched - items.len(),
            "Fetched feed"
        );

        self.cache.set(FEED_CACHE_KEY, items.clone(), self.ttl);
        Ok(items)
    }

    /// Drops the cached snapshot and fetches a fresh one
    pub async fn refresh_feed(&self) -> Result<Vec<FeedItem>, FeedError> {
        self.invalidate();
        self.get_feed().await
    }

    /// Drops the cached snapshot without fetching
    pub fn invalidate(&self) {
        debug!("Invalidating feed cache");
        self.cache.delete(FEED_CACHE_KEY);
    }
}
