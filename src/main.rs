//! swipefeed - fetch and cache an image feed from an AT Protocol timeline
//!
//! Logs in with the configured account, keeps the timeline posts that embed
//! an image, and prints them. Results are cached on disk so repeated runs
//! within the TTL don't hit the network.

use std::io;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::info;
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

use swipefeed::bluesky::BlueskyFeedSource;
use swipefeed::cache::{CacheStore, FileCacheStore, MemoryCacheStore};
use swipefeed::cli::{Cli, Command, OutputFormat};
use swipefeed::config::{CacheBackend, FeedConfig};
use swipefeed::feed::{FeedItem, FeedService, FEED_CACHE_KEY};
use swipefeed::logging::log_filter;
use swipefeed::output::write_items;
use swipefeed::refresh::{watch_until, RefreshConfig, RefreshHandle};

type SharedCache = Arc<dyn CacheStore<Vec<FeedItem>>>;

fn init_logging(verbose: bool, quiet: bool) {
    let env = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter = log_filter(verbose, quiet, env.as_deref());

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr).with_target(false))
        .with(filter)
        .init();
}

fn build_cache(config: &FeedConfig) -> SharedCache {
    match &config.cache {
        CacheBackend::Disk(dir) => Arc::new(FileCacheStore::with_dir(dir.clone())),
        CacheBackend::Memory => Arc::new(MemoryCacheStore::new()),
    }
}

fn print_items(items: &[FeedItem], format: OutputFormat) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_items(&mut out, items, format)
}

/// Polls the feed until Ctrl-C, printing items missing from the previous poll
async fn watch(
    service: Arc<FeedService<BlueskyFeedSource, SharedCache>>,
    interval: Duration,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let handle = RefreshHandle::spawn(service, RefreshConfig { interval });

    info!(interval_secs = interval.as_secs(), "Watching feed, press Ctrl-C to stop");
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
        info!("Stopping");
    };
    watch_until(handle, ctrl_c, |fresh| print_items(fresh, format)).await?;
    Ok(())
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = FeedConfig::from_cli(&cli)?;
    let cache = build_cache(&config);
    let command = cli.command();

    if command == Command::ClearCache {
        cache.delete(FEED_CACHE_KEY);
        info!("Cache cleared");
        return Ok(());
    }

    let source = BlueskyFeedSource::from_config(&config)?;
    let service = Arc::new(FeedService::with_ttl(source, cache, config.cache_ttl));

    match command {
        Command::Show => print_items(&service.get_feed().await?, cli.format)?,
        Command::Refresh => print_items(&service.refresh_feed().await?, cli.format)?,
        Command::Watch { interval } => {
            watch(service, Duration::from_secs(interval), cli.format).await?
        }
        // Handled before the source is built
        Command::ClearCache => {}
    }

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    // Credentials may live in a .env file in the working directory
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
