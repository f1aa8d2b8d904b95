//! Logging setup: tracing to stderr, filtered by RUST_LOG or the configured level

use tracing_subscriber::EnvFilter;

const LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Level used when RUST_LOG is not set
pub fn effective_level(configured: &str, verbose: bool) -> &str {
    if verbose {
        return "debug";
    }
    if LEVELS.contains(&configured) {
        configured
    } else {
        "info"
    }
}

pub fn init_logging(configured: &str, verbose: bool) {
    let level = effective_level(configured, verbose);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // stdout carries command output
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();

    if !LEVELS.contains(&configured) {
        tracing::warn!("Invalid log level '{}', defaulting to 'info'", configured);
    }
}
