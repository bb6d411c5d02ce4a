//! Project-wide constants.

use std::net::{Ipv4Addr, SocketAddr};

/// Environment variable the hosting platform sets to the deployed service name.
pub const SERVICE_NAME_ENV: &str = "FUNCTION_NAME";

/// Default metadata service host, overridable for local emulators.
pub const DEFAULT_METADATA_HOST: &str = "metadata.google.internal";

/// Path of the project-id attribute on the metadata service.
pub const PROJECT_ID_PATH: &str = "computeMetadata/v1/project/project-id";

/// Header the metadata service requires on every request.
pub const METADATA_FLAVOR_HEADER: &str = "Metadata-Flavor";
pub const METADATA_FLAVOR: &str = "Google";

/// Seconds to wait for the metadata service before giving up.
pub const METADATA_TIMEOUT_SECS: u64 = 5;

/// Default SQLite database for the pricelist-history engine.
pub const DEFAULT_DB_PATH: &str = "pricelist-histories.db";

/// Default log filter directive when `RUST_LOG` is unset.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Default listen address.
pub fn default_bind_addr() -> SocketAddr {
    SocketAddr::from((Ipv4Addr::UNSPECIFIED, 8080))
}
