//! Command-line interface parsing for swipefeed
//!
//! This module handles parsing of CLI arguments using clap and turns them
//! into a validated [`FeedConfig`]. Credentials and the service URL fall back
//! to environment variables (also loaded from a `.env` file by the binary).

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use thiserror::Error;

use crate::cache::FileCacheStore;
use crate::config::{
    CacheBackend, Credentials, FeedConfig, DEFAULT_PAGE_SIZE, DEFAULT_SERVICE_URL, MAX_PAGE_SIZE,
};
use crate::feed::{FeedItem, DEFAULT_CACHE_TTL};

/// Error types for CLI argument validation
#[derive(Debug, Error)]
pub enum CliError {
    /// A network command was requested without login details
    #[error("Missing credentials: set --identifier/--password or ATPROTO_USERNAME/ATPROTO_PASSWORD")]
    MissingCredentials,

    /// The page size is outside what the timeline endpoint accepts
    #[error("Invalid page size: {0}. Must be between 1 and {max}", max = MAX_PAGE_SIZE)]
    InvalidPageSize(u8),

    /// A zero request timeout would fail every request
    #[error("Invalid timeout: must be at least 1 second")]
    InvalidTimeout,

    /// No home directory to derive a cache location from
    #[error("Could not determine a cache directory; pass --cache-dir or --no-persist")]
    NoCacheDir,
}

/// swipefeed - fetch and cache an image feed from an AT Protocol timeline
#[derive(Parser, Debug)]
#[command(name = "swipefeed")]
#[command(about = "Fetch, filter and cache an AT Protocol media feed")]
#[command(version)]
pub struct Cli {
    /// AT Protocol service to log in to
    #[arg(long, env = "ATPROTO_SERVICE", default_value = DEFAULT_SERVICE_URL)]
    pub service: String,

    /// Account handle, DID or email
    #[arg(long, env = "ATPROTO_USERNAME")]
    pub identifier: Option<String>,

    /// Account or app password
    #[arg(long, env = "ATPROTO_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Timeline entries to request per fetch (1-100)
    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
    pub page_size: u8,

    /// Seconds a fetched feed is served from cache
    #[arg(long, default_value_t = DEFAULT_CACHE_TTL.as_secs())]
    pub ttl_secs: u64,

    /// Seconds before an upstream request is abandoned
    #[arg(long, default_value_t = 30)]
    pub timeout_secs: u64,

    /// Directory for the on-disk cache (defaults to the XDG cache directory)
    #[arg(long, value_name = "DIR", conflicts_with = "no_persist")]
    pub cache_dir: Option<PathBuf>,

    /// Keep the cache in memory only
    #[arg(long)]
    pub no_persist: bool,

    /// Output format for feed items
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Enable debug logging
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log errors
    #[arg(short, long)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Print the current feed, from cache when fresh (default)
    Show,
    /// Discard the cached feed and fetch a new one
    Refresh,
    /// Keep polling and print items as they appear
    Watch {
        /// Seconds between polls
        #[arg(long, default_value_t = 60, value_parser = clap::value_parser!(u64).range(1..))]
        interval: u64,
    },
    /// Remove the cached feed
    ClearCache,
}

impl Command {
    /// Whether this command may contact the upstream
    pub fn needs_network(&self) -> bool {
        !matches!(self, Command::ClearCache)
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// One tab-separated line per item
    Text,
    /// Pretty-printed JSON array
    Json,
}

impl Cli {
    /// The requested command, `show` when none was given
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Show)
    }
}

/// Returns credentials only when both parts are non-empty
fn credentials_from(identifier: Option<&str>, password: Option<&str>) -> Option<Credentials> {
    let identifier = identifier.map(str::trim).filter(|s| !s.is_empty())?;
    let password = password.filter(|s| !s.is_empty())?;
    Some(Credentials::new(identifier, password))
}

impl FeedConfig {
    /// Creates a FeedConfig from parsed CLI arguments.
    ///
    /// # Returns
    /// * `Ok(FeedConfig)` with validated settings
    /// * `Err(CliError)` if a value is out of range, or credentials are
    ///   missing for a command that needs the network
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        if cli.page_size == 0 || cli.page_size > MAX_PAGE_SIZE {
            return Err(CliError::InvalidPageSize(cli.page_size));
        }
        if cli.timeout_secs == 0 {
            return Err(CliError::InvalidTimeout);
        }

        let credentials = credentials_from(cli.identifier.as_deref(), cli.password.as_deref());
        if credentials.is_none() && cli.command().needs_network() {
            return Err(CliError::MissingCredentials);
        }

        let cache = if cli.no_persist {
            CacheBackend::Memory
        } else {
            let dir = match &cli.cache_dir {
                Some(dir) => dir.clone(),
                None => FileCacheStore::<Vec<FeedItem>>::default_dir().ok_or(CliError::NoCacheDir)?,
            };
            CacheBackend::Disk(dir)
        };

        Ok(FeedConfig {
            service_url: cli.service.clone(),
            credentials,
            page_size: cli.page_size,
            cache_ttl: Duration::from_secs(cli.ttl_secs),
            request_timeout: Duration::from_secs(cli.timeout_secs),
            cache,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Explicit flags override any ATPROTO_* variables in the test environment
    const CREDS: [&str; 4] = ["--identifier", "alice.bsky.social", "--password", "pw"];
    const NO_CREDS: [&str; 4] = ["--identifier", "", "--password", ""];

    fn parse(args: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("swipefeed").chain(args.iter().copied()))
    }

    #[test]
    fn test_cli_parse_no_command_defaults_to_show() {
        let cli = parse(&[]);
        assert!(cli.command.is_none());
        assert_eq!(cli.command(), Command::Show);
    }

    #[test]
    fn test_cli_parse_watch_interval() {
        let cli = parse(&["watch", "--interval", "15"]);
        assert_eq!(cli.command(), Command::Watch { interval: 15 });
    }

    #[test]
    fn test_cli_rejects_zero_interval() {
        let result = Cli::try_parse_from(["swipefeed", "watch", "--interval", "0"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_rejects_cache_dir_with_no_persist() {
        let result =
            Cli::try_parse_from(["swipefeed", "--cache-dir", "/tmp/x", "--no-persist", "show"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_parse_format() {
        let cli = parse(&["--format", "json"]);
        assert_eq!(cli.format, OutputFormat::Json);
    }

    #[test]
    fn test_from_cli_builds_config() {
        let mut args = CREDS.to_vec();
        args.extend(["--page-size", "50", "--ttl-secs", "60", "--cache-dir", "/tmp/feeds", "show"]);
        let config = FeedConfig::from_cli(&parse(&args)).unwrap();

        assert_eq!(config.page_size, 50);
        assert_eq!(config.cache_ttl, Duration::from_secs(60));
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.cache, CacheBackend::Disk(PathBuf::from("/tmp/feeds")));
        assert_eq!(
            config.credentials,
            Some(Credentials::new("alice.bsky.social", "pw"))
        );
    }

    #[test]
    fn test_from_cli_no_persist_uses_memory() {
        let mut args = CREDS.to_vec();
        args.push("--no-persist");
        let config = FeedConfig::from_cli(&parse(&args)).unwrap();
        assert_eq!(config.cache, CacheBackend::Memory);
    }

    #[test]
    fn test_from_cli_invalid_page_size() {
        for size in ["0", "101"] {
            let mut args = CREDS.to_vec();
            args.extend(["--page-size", size, "--no-persist"]);
            let err = FeedConfig::from_cli(&parse(&args)).unwrap_err();
            assert!(matches!(err, CliError::InvalidPageSize(_)));
            assert!(err.to_string().contains("Invalid page size"));
        }
    }

    #[test]
    fn test_from_cli_zero_timeout() {
        let mut args = CREDS.to_vec();
        args.extend(["--timeout-secs", "0", "--no-persist"]);
        let err = FeedConfig::from_cli(&parse(&args)).unwrap_err();
        assert!(matches!(err, CliError::InvalidTimeout));
    }

    #[test]
    fn test_from_cli_missing_credentials_for_network_command() {
        let mut args = NO_CREDS.to_vec();
        args.extend(["--no-persist", "refresh"]);
        let err = FeedConfig::from_cli(&parse(&args)).unwrap_err();
        assert!(matches!(err, CliError::MissingCredentials));
    }

    #[test]
    fn test_from_cli_clear_cache_needs_no_credentials() {
        let mut args = NO_CREDS.to_vec();
        args.extend(["--no-persist", "clear-cache"]);
        let config = FeedConfig::from_cli(&parse(&args)).unwrap();
        assert!(config.credentials.is_none());
    }

    #[test]
    fn test_credentials_require_both_parts() {
        assert!(credentials_from(Some("alice"), None).is_none());
        assert!(credentials_from(None, Some("pw")).is_none());
        assert!(credentials_from(Some("  "), Some("pw")).is_none());
        assert_eq!(
            credentials_from(Some(" alice "), Some("pw")),
            Some(Credentials::new("alice", "pw"))
        );
    }
}
