//! Runtime configuration for the service, assembled by `main` from flags and env.

use std::net::SocketAddr;

use crate::consts::{DEFAULT_DB_PATH, DEFAULT_METADATA_HOST, default_bind_addr};
use crate::logging::LogConfig;

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub bind: SocketAddr,
    /// Required at init; `None` here means it was not provided.
    pub service_name: Option<String>,
    /// When set, the metadata service is not consulted.
    pub project_id: Option<String>,
    pub metadata_host: String,
    pub database: String,
    pub log: LogConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind: default_bind_addr(),
            service_name: None,
            project_id: None,
            metadata_host: DEFAULT_METADATA_HOST.to_string(),
            database: DEFAULT_DB_PATH.to_string(),
            log: LogConfig::default(),
        }
    }
}

impl ServiceConfig {
    /// Replace the port of the bind address (the `PORT` convention of serverless hosts).
    pub fn with_port(mut self, port: Option<u16>) -> Self {
        if let Some(port) = port {
            self.bind.set_port(port);
        }
        self
    }
}
