//! Tracing subscriber setup for the CLI.
//!
//! Filter precedence: `--log`, then `ACP_TRANSCRIPT_LOG`, then `warn`. Output goes
//! to stderr so stdout carries only permission responses.

use std::io;

use tracing_subscriber::EnvFilter;

pub const DEFAULT_FILTER: &str = "warn";

/// Picks the filter directive the subscriber is built from.
#[must_use]
pub fn resolve_filter(cli: Option<&str>, env: Option<&str>) -> String {
    cli.or(env)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or(DEFAULT_FILTER)
        .to_string()
}

pub fn init(filter: &str) -> io::Result<()> {
    let filter = EnvFilter::try_new(filter).map_err(io::Error::other)?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init()
        .map_err(io::Error::other)
}
