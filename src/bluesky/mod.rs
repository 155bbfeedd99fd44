//! AT Protocol (Bluesky) feed provider
//!
//! [`AtpClient`] speaks the two XRPC calls the feed needs: session creation
//! and home timeline retrieval. [`BlueskyFeedSource`] wraps it as a
//! [`FeedSource`](crate::feed::FeedSource), logging in lazily and keeping only
//! timeline posts that embed an image.

mod client;
mod source;

pub use client::{AtpClient, Session};
pub use source::{BlueskyFeedSource, SOURCE_TAG};
