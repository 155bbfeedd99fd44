//! Log filter selection for the binary

use tracing_subscriber::filter::EnvFilter;

/// Level used when `RUST_LOG` is unset, empty or unparsable
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Builds the log filter from the command-line flags and `RUST_LOG`
///
/// `-q` and `-v` win over the environment. Otherwise `env` is used as given,
/// so `RUST_LOG=debug` really lowers the level.
pub fn log_filter(verbose: bool, quiet: bool, env: Option<&str>) -> EnvFilter {
    if quiet {
        return EnvFilter::new("error");
    }
    if verbose {
        return EnvFilter::new("debug");
    }

    env.filter(|directives| !directives.trim().is_empty())
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_LEVEL))
}
