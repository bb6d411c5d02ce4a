//! Cold start: everything that must succeed before the first request is served.
//!
//! Any failure here is fatal. There are no retries; `main` exits with the error.

use anyhow::{Context, Result};
use std::sync::Arc;

use crate::config::ServiceConfig;
use crate::engine::sqlite::{EngineConfig, SqliteEngine};
use crate::identity::ProcessIdentity;
use crate::logging;
use crate::server::AppState;

/// Resolve identity, install the log sink, build the engine.
pub async fn bootstrap(config: &ServiceConfig) -> Result<AppState> {
    let identity = ProcessIdentity::resolve(
        config.project_id.clone(),
        config.service_name.clone(),
        &config.metadata_host,
    )
    .await
    .context("failed to resolve process identity")?;

    logging::init(&identity, &config.log).context("failed to configure logging")?;

    tracing::info!(service = %identity.service_name, "Initializing service");
    tracing::info!(
        project = %identity.project_id,
        service_name = %identity.service_name,
        "Producing compute-pricelist-histories state"
    );

    let engine = SqliteEngine::open(&EngineConfig {
        project_id: identity.project_id.clone(),
        database: config.database.clone(),
    })
    .context("failed to build compute-pricelist-histories engine")?;

    tracing::info!("Finished init");
    Ok(AppState::new(identity, Arc::new(engine)))
}
