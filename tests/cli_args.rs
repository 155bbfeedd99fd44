//! Integration tests for CLI argument handling
//!
//! Runs the binary for flags that exit before any network access.

use std::process::Command;

use tempfile::TempDir;

/// Helper to run the CLI with given args and capture output
///
/// Clears the ATPROTO_* variables so the host environment can't leak in.
fn run_cli(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_swipefeed"))
        .args(args)
        .env_remove("ATPROTO_USERNAME")
        .env_remove("ATPROTO_PASSWORD")
        .env_remove("ATPROTO_SERVICE")
        .output()
        .expect("Failed to execute swipefeed")
}

#[test]
fn test_help_flag_exits_successfully() {
    let output = run_cli(&["--help"]);
    assert!(output.status.success(), "Expected --help to exit successfully");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("swipefeed"), "Help should mention swipefeed");
    assert!(stdout.contains("refresh"), "Help should list the refresh command");
    assert!(stdout.contains("--ttl-secs"), "Help should mention --ttl-secs");
}

#[test]
fn test_missing_credentials_prints_error_and_exits() {
    let output = run_cli(&["--no-persist", "show"]);
    assert!(!output.status.success(), "Expected missing credentials to fail");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Missing credentials"),
        "Should explain which credentials are missing: {}",
        stderr
    );
}

#[test]
fn test_invalid_page_size_exits_with_error() {
    let output = run_cli(&[
        "--identifier",
        "alice",
        "--password",
        "pw",
        "--page-size",
        "0",
        "--no-persist",
    ]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Invalid page size"), "stderr: {}", stderr);
}

#[test]
fn test_unknown_format_is_rejected() {
    let output = run_cli(&["--format", "xml", "show"]);
    assert!(!output.status.success());
}

#[test]
fn test_clear_cache_without_credentials_succeeds() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let cache_file = temp_dir.path().join("feed_cache.json");
    std::fs::write(&cache_file, "{}").unwrap();

    let output = run_cli(&[
        "--cache-dir",
        temp_dir.path().to_str().unwrap(),
        "clear-cache",
    ]);

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert!(!cache_file.exists(), "clear-cache should remove the feed cache file");
}

#[cfg(test)]
mod unit_tests {
    //! Unit tests for CLI parsing that don't require running the binary

    use clap::Parser;
    use swipefeed::cli::{Cli, CliError, Command, OutputFormat};
    use swipefeed::config::{CacheBackend, FeedConfig};

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["swipefeed", "--identifier", "", "--password", ""]);
        assert_eq!(cli.page_size, 20);
        assert_eq!(cli.ttl_secs, 300);
        assert_eq!(cli.format, OutputFormat::Text);
        assert_eq!(cli.command(), Command::Show);
    }

    #[test]
    fn test_cli_watch_default_interval() {
        let cli = Cli::parse_from(["swipefeed", "watch"]);
        assert_eq!(cli.command(), Command::Watch { interval: 60 });
    }

    #[test]
    fn test_from_cli_memory_backend() {
        let cli = Cli::parse_from([
            "swipefeed",
            "--identifier",
            "alice",
            "--password",
            "pw",
            "--no-persist",
            "refresh",
        ]);
        let config = FeedConfig::from_cli(&cli).unwrap();
        assert_eq!(config.cache, CacheBackend::Memory);
        assert_eq!(cli.command(), Command::Refresh);
    }

    #[test]
    fn test_from_cli_missing_credentials() {
        let cli = Cli::parse_from([
            "swipefeed",
            "--identifier",
            "",
            "--password",
            "",
            "--no-persist",
            "watch",
        ]);
        let result = FeedConfig::from_cli(&cli);
        assert!(matches!(result, Err(CliError::MissingCredentials)));
    }
}
