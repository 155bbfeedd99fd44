//! swipefeed library
//!
//! Fetches a media feed from a pluggable source, keeps only entries that can
//! be displayed, and caches the result behind a time-to-live. The binary in
//! `main.rs` wires these pieces to an AT Protocol timeline.

pub mod bluesky;
pub mod cache;
pub mod cli;
pub mod config;
pub mod feed;
pub mod logging;
pub mod output;
pub mod refresh;
