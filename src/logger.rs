//! Logging support for bisonfix
//!
//! Events go to stderr so they never mix with preview output on stdout.
//! `--verbose` raises the filter to debug; RUST_LOG overrides both.

use anyhow::Result;
use tracing_subscriber::{fmt, prelude::*, registry, EnvFilter};

/// Initialize the logging system. Call once, before any file is processed.
pub fn init_logging(verbose: bool) -> Result<()> {
    let default_filter = if verbose {
        "bisonfix=debug"
    } else {
        "bisonfix=info"
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    let subscriber = registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false),
        )
        .with(filter);

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to set tracing subscriber: {}", e))?;

    Ok(())
}
