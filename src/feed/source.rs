//! The capability a feed provider implements

use async_trait::async_trait;
use thiserror::Error;

use super::FeedItem;

/// Errors raised by [`FeedSource::fetch_feed`]
///
/// Every variant means the upstream could not be used for this fetch.
#[derive(Debug, Error)]
pub enum SourceError {
    /// HTTP request failed (connection, timeout, body decoding)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Login was refused or credentials are missing
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// The upstream answered with a non-success status
    #[error("Upstream rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// The upstream answered with something that is not a feed page
    #[error("Invalid upstream response: {0}")]
    InvalidResponse(String),

    /// Failure from a provider that doesn't fit the other variants
    #[error(transparent)]
    Other(Box<dyn std::error::Error + Send + Sync>),
}

/// A provider of raw feed entries
///
/// Implementations do their own network work in [`fetch_feed`] and expose a
/// pure per-entry transform in [`process_feed_item`]. Entries without a
/// displayable media reference map to `None`; they are not errors.
///
/// [`fetch_feed`]: FeedSource::fetch_feed
/// [`process_feed_item`]: FeedSource::process_feed_item
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Provider-specific shape of one entry, before normalization
    type Raw: Send;

    /// Fetches one batch of raw entries from the upstream
    async fn fetch_feed(&self) -> Result<Vec<Self::Raw>, SourceError>;

    /// Converts one raw entry into a [`FeedItem`], or `None` if it can't be shown
    fn process_feed_item(&self, raw: &Self::Raw) -> Option<FeedItem>;
}
