//! Logging init for binaries and tests that embed rreq.
//!
//! The library itself only emits `tracing` events; installing a subscriber is
//! left to the host application. These helpers cover the common stderr case.

use anyhow::Result;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info,rreq_core=debug";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Initialize structured logging to stderr. Honors `RUST_LOG`, defaulting to `info,rreq_core=debug`.
/// Panics if a global subscriber is already installed; see [`try_init_logging_stderr`].
pub fn init_logging_stderr() {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

/// Like [`init_logging_stderr`] but returns Err instead of panicking when a subscriber is already set.
pub fn try_init_logging_stderr() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to initialize logging: {}", e))?;
    tracing::debug!("rreq logging initialized");
    Ok(())
}
