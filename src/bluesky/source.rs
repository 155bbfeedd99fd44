//! Timeline-backed feed source

use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::{AtpClient, Session};
use crate::config::{Credentials, FeedConfig, DEFAULT_PAGE_SIZE};
use crate::feed::{FeedItem, FeedMetadata, FeedSource, SourceError};

/// Value of `metadata.source` on items from this provider
pub const SOURCE_TAG: &str = "ATProto";

/// One timeline entry, reduced to the fields normalization reads
#[derive(Debug, Deserialize)]
struct FeedViewPost {
    post: PostView,
}

#[derive(Debug, Deserialize)]
struct PostView {
    /// `at://` URI of the post
    uri: String,
    #[serde(default)]
    author: Option<Author>,
    #[serde(default)]
    embed: Option<EmbedView>,
}

#[derive(Debug, Deserialize)]
struct Author {
    #[serde(default)]
    handle: Option<String>,
}

/// An embed view: either images directly (`app.bsky.embed.images#view`) or
/// a quoted record with media (`app.bsky.embed.recordWithMedia#view`)
#[derive(Debug, Deserialize)]
struct EmbedView {
    #[serde(default)]
    images: Vec<ImageView>,
    #[serde(default)]
    media: Option<Box<EmbedView>>,
}

#[derive(Debug, Deserialize)]
struct ImageView {
    #[serde(default)]
    fullsize: Option<String>,
}

impl EmbedView {
    /// Full-size URL of the first embedded image, if it has one
    fn fullsize_url(&self) -> Option<&str> {
        if let Some(image) = self.images.first() {
            return image.fullsize.as_deref().filter(|url| !url.is_empty());
        }
        self.media.as_deref().and_then(EmbedView::fullsize_url)
    }
}

/// Feed source reading the authenticated user's home timeline
///
/// Logs in on the first fetch and reuses the session afterwards. A failed
/// login leaves no session behind, so the next fetch tries again.
#[derive(Debug)]
pub struct BlueskyFeedSource {
    client: AtpClient,
    credentials: Credentials,
    page_size: u8,
    session: Mutex<Option<Session>>,
}

impl BlueskyFeedSource {
    pub fn new(client: AtpClient, credentials: Credentials) -> Self {
        Self {
            client,
            credentials,
            page_size: DEFAULT_PAGE_SIZE,
            session: Mutex::new(None),
        }
    }

    /// Builds a source from configuration
    ///
    /// Fails with `SourceError::Authentication` if no credentials are configured.
    pub fn from_config(config: &FeedConfig) -> Result<Self, SourceError> {
        let credentials = config.credentials.clone().ok_or_else(|| {
            SourceError::Authentication("no credentials configured".to_string())
        })?;
        let client = AtpClient::new(&config.service_url, config.request_timeout)?;
        Ok(Self::new(client, credentials).with_page_size(config.page_size))
    }

    pub fn with_page_size(mut self, page_size: u8) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn page_size(&self) -> u8 {
        self.page_size
    }

    /// Whether a login has succeeded on this source
    pub async fn is_authenticated(&self) -> bool {
        self.session.lock().await.is_some()
    }

    /// Returns the current session, logging in first if there is none
    async fn ensure_session(&self) -> Result<Session, SourceError> {
        let mut session = self.session.lock().await;
        if let Some(existing) = session.as_ref() {
            return Ok(existing.clone());
        }

        let created = match self.client.create_session(&self.credentials).await {
            Ok(created) => created,
            Err(e) => {
                warn!(identifier = %self.credentials.identifier, error = %e, "Login failed");
                return Err(e);
            }
        };
        info!(handle = %created.handle, did = %created.did, "Logged in");
        *session = Some(created.clone());
        Ok(created)
    }
}

#[async_trait]
impl FeedSource for BlueskyFeedSource {
    type Raw = Value;

    async fn fetch_feed(&self) -> Result<Vec<Value>, SourceError> {
        let session = self.ensure_session().await?;
        self.client.get_timeline(&session, self.page_size).await
    }

    fn process_feed_item(&self, raw: &Value) -> Option<FeedItem> {
        let entry = match FeedViewPost::deserialize(raw) {
            Ok(entry) => entry,
            Err(e) => {
                debug!(error = %e, "Skipping unrecognised timeline entry");
                return None;
            }
        };

        let post = entry.post;
        let uri = post.embed.as_ref()?.fullsize_url()?;

        let mut metadata = FeedMetadata::new(Utc::now(), SOURCE_TAG);
        if let Some(handle) = post.author.and_then(|author| author.handle) {
            metadata.extra.insert("author".to_string(), Value::String(handle));
        }

        Some(FeedItem::new(post.uri, uri)?.with_metadata(metadata))
    }
}
