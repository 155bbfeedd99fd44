//! Core feed types for swipefeed
//!
//! This module contains the canonical [`FeedItem`] shape handed to
//! presentation code, the [`FeedSource`] capability that providers implement,
//! and the [`FeedService`] that puts a cache in front of a source.

pub mod service;
pub mod source;

pub use service::{FeedError, FeedService, DEFAULT_CACHE_TTL, FEED_CACHE_KEY};
pub use source::{FeedSource, SourceError};

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A display-ready unit of feed content
///
/// Both `id` and `uri` are guaranteed non-empty: the only way to build one is
/// [`FeedItem::new`], which rejects empty values. Deserialization goes through
/// the same check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawFeedItem")]
pub struct FeedItem {
    /// Provider-assigned identifier, used as the dedup key
    id: String,
    /// Locator of the media asset
    uri: String,
    /// Provenance information, when the source supplies it
    #[serde(skip_serializing_if = "Option::is_none")]
    metadata: Option<FeedMetadata>,
}

impl FeedItem {
    /// Creates a feed item, or `None` if `id` or `uri` is empty
    pub fn new(id: impl Into<String>, uri: impl Into<String>) -> Option<Self> {
        let id = id.into();
        let uri = uri.into();
        if id.trim().is_empty() || uri.trim().is_empty() {
            return None;
        }
        Some(Self {
            id,
            uri,
            metadata: None,
        })
    }

    /// Attaches metadata to the item
    pub fn with_metadata(mut self, metadata: FeedMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn metadata(&self) -> Option<&FeedMetadata> {
        self.metadata.as_ref()
    }
}

/// Open metadata mapping carried by a [`FeedItem`]
///
/// `createdAt` and `source` are always present; anything else a provider wants
/// to pass along lives in `extra` and is flattened into the same JSON object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedMetadata {
    /// When the item was created (serialized as ISO-8601)
    pub created_at: DateTime<Utc>,
    /// Tag naming the originating provider
    pub source: String,
    /// Additional provider-specific values
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl FeedMetadata {
    pub fn new(created_at: DateTime<Utc>, source: impl Into<String>) -> Self {
        Self {
            created_at,
            source: source.into(),
            extra: BTreeMap::new(),
        }
    }
}

/// Unchecked wire shape of a [`FeedItem`]
#[derive(Deserialize)]
struct RawFeedItem {
    id: String,
    uri: String,
    #[serde(default)]
    metadata: Option<FeedMetadata>,
}

impl TryFrom<RawFeedItem> for FeedItem {
    type Error = String;

    fn try_from(raw: RawFeedItem) -> Result<Self, Self::Error> {
        let item = FeedItem::new(raw.id, raw.uri)
            .ok_or_else(|| "feed item requires a non-empty id and uri".to_string())?;
        Ok(match raw.metadata {
            Some(metadata) => item.with_metadata(metadata),
            None => item,
        })
    }
}
