//! Log sink setup. Installed once during init; every component logs through `tracing`.

use anyhow::{Result, anyhow};
use clap::ValueEnum;
use tracing_subscriber::EnvFilter;

use crate::identity::ProcessIdentity;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// One JSON object per line, with the current span's fields.
    Json,
    /// Human-readable output for local runs.
    Pretty,
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Filter directive used when no explicit filter is given.
    pub level: String,
    /// Full filter directive (`RUST_LOG`). Takes precedence over `level`.
    pub filter: Option<String>,
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: crate::consts::DEFAULT_LOG_LEVEL.to_string(),
            filter: None,
            format: LogFormat::Json,
        }
    }
}

/// Build the filter: an explicit `filter` wins, otherwise `level`.
/// A malformed directive is an error, never a silent fallback.
pub fn env_filter(config: &LogConfig) -> Result<EnvFilter> {
    match config.filter.as_deref().filter(|f| !f.trim().is_empty()) {
        Some(directive) => EnvFilter::try_new(directive)
            .map_err(|e| anyhow!("invalid RUST_LOG {directive:?}: {e}")),
        None => EnvFilter::try_new(&config.level)
            .map_err(|e| anyhow!("invalid log level {:?}: {e}", config.level)),
    }
}

/// Install the global subscriber. Fails if the level is invalid or a
/// subscriber is already installed.
pub fn init(identity: &ProcessIdentity, config: &LogConfig) -> Result<()> {
    let filter = env_filter(config)?;

    let installed = match config.format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_current_span(true)
            .with_span_list(false)
            .with_env_filter(filter)
            .try_init(),
        LogFormat::Pretty => tracing_subscriber::fmt().with_env_filter(filter).try_init(),
    };
    installed.map_err(|e| anyhow!("could not install log sink: {e}"))?;

    tracing::info!(
        project = %identity.project_id,
        service = %identity.service_name,
        "Configured log sink"
    );
    Ok(())
}
