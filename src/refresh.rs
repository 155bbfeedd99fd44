//! Background feed refresh
//!
//! Polls a [`FeedService`] on an interval from a tokio task and sends the
//! results to the caller over a channel. Each poll goes through the cache, so
//! the service's TTL decides how often the upstream is actually hit.

use std::collections::HashSet;
use std::future::Future;
use std::io;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::cache::CacheStore;
use crate::feed::{FeedItem, FeedService, FeedSource};

/// Messages sent from the background task to the caller
#[derive(Debug, Clone)]
pub enum RefreshMessage {
    /// A poll returned this feed snapshot
    FeedUpdated(Vec<FeedItem>),
    /// A poll failed; polling continues on the next tick
    RefreshError(String),
}

/// Configuration for the polling loop
#[derive(Debug, Clone)]
pub struct RefreshConfig {
    /// Time between polls
    pub interval: Duration,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(60),
        }
    }
}

/// Handle for controlling the background refresh task
pub struct RefreshHandle {
    /// Channel for receiving refresh messages
    pub receiver: mpsc::Receiver<RefreshMessage>,
    /// Signals the task to stop
    shutdown_tx: mpsc::Sender<()>,
}

impl RefreshHandle {
    /// Spawns the polling task
    ///
    /// The first poll runs immediately. The task stops when [`shutdown`] is
    /// called or the receiver is dropped.
    ///
    /// [`shutdown`]: RefreshHandle::shutdown
    pub fn spawn<S, C>(service: Arc<FeedService<S, C>>, config: RefreshConfig) -> Self
    where
        S: FeedSource + 'static,
        C: CacheStore<Vec<FeedItem>> + 'static,
    {
        let (msg_tx, msg_rx) = mpsc::channel(32);
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(config.interval);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        let message = match service.get_feed().await {
                            Ok(items) => RefreshMessage::FeedUpdated(items),
                            Err(e) => RefreshMessage::RefreshError(e.to_string()),
                        };
                        if msg_tx.send(message).await.is_err() {
                            debug!("Refresh receiver dropped, stopping");
                            break;
                        }
                    }
                    _ = shutdown_rx.recv() => {
                        break;
                    }
                }
            }
        });

        Self {
            receiver: msg_rx,
            shutdown_tx,
        }
    }

    /// Shuts down the background refresh task
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(()).await;
    }
}

/// Remembers which item ids were in the last snapshot
///
/// Only the latest snapshot is kept, so memory stays bounded by the page
/// size however long a watch runs.
#[derive(Debug, Default)]
pub struct SeenItems {
    ids: HashSet<String>,
}

impl SeenItems {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the items absent from the previous snapshot, in their original
    /// order, and makes `items` the new snapshot
    pub fn retain_new(&mut self, items: Vec<FeedItem>) -> Vec<FeedItem> {
        let snapshot: HashSet<String> =
            items.iter().map(|item| item.id().to_string()).collect();
        let fresh = items
            .into_iter()
            .filter(|item| !self.ids.contains(item.id()))
            .collect();
        self.ids = snapshot;
        fresh
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Drains refresh messages until `shutdown` resolves or the task stops
///
/// New items are handed to `on_items`; poll errors are logged and watching
/// continues. The refresh task is shut down before returning.
pub async fn watch_until<F, W>(
    mut handle: RefreshHandle,
    shutdown: F,
    mut on_items: W,
) -> io::Result<()>
where
    F: Future<Output = ()>,
    W: FnMut(&[FeedItem]) -> io::Result<()>,
{
    let mut seen = SeenItems::new();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            message = handle.receiver.recv() => match message {
                Some(RefreshMessage::FeedUpdated(items)) => {
                    let fresh = seen.retain_new(items);
                    if !fresh.is_empty() {
                        on_items(&fresh)?;
                    }
                }
                Some(RefreshMessage::RefreshError(e)) => warn!("{}", e),
                None => break,
            },
            _ = &mut shutdown => {
                debug!("Watch shutdown requested");
                break;
            }
        }
    }

    handle.shutdown().await;
    Ok(())
}
