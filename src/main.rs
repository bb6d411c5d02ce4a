use std::net::SocketAddr;

use clap::Parser;

use compute_pricelist_histories::config::ServiceConfig;
use compute_pricelist_histories::consts::{DEFAULT_DB_PATH, DEFAULT_LOG_LEVEL, DEFAULT_METADATA_HOST};
use compute_pricelist_histories::init::bootstrap;
use compute_pricelist_histories::logging::{LogConfig, LogFormat};
use compute_pricelist_histories::server;

#[derive(Parser)]
#[command(
    name = "compute-pricelist-histories",
    version,
    about = "Computes pricelist histories for one auction snapshot per request."
)]
struct Cli {
    /// Address to listen on
    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0:8080")]
    bind: SocketAddr,

    /// Port override for the listen address
    #[arg(long, env = "PORT")]
    port: Option<u16>,

    /// Service name (required)
    #[arg(long, env = "FUNCTION_NAME")]
    service_name: Option<String>,

    /// Project id; skips the metadata service lookup when set
    #[arg(long, env = "GOOGLE_CLOUD_PROJECT")]
    project_id: Option<String>,

    /// Metadata service host
    #[arg(long, env = "GCE_METADATA_HOST", default_value = DEFAULT_METADATA_HOST)]
    metadata_host: String,

    /// SQLite database for auctions and histories (use :memory: for ephemeral)
    #[arg(long, env = "PRICELIST_DB", default_value = DEFAULT_DB_PATH)]
    db: String,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, env = "LOG_LEVEL", default_value = DEFAULT_LOG_LEVEL)]
    log_level: String,

    /// Full log filter directive; overrides --log-level
    #[arg(long, env = "RUST_LOG")]
    log_filter: Option<String>,

    /// Log output format
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Json)]
    log_format: LogFormat,
}

impl From<Cli> for ServiceConfig {
    fn from(cli: Cli) -> Self {
        ServiceConfig {
            bind: cli.bind,
            service_name: cli.service_name,
            project_id: cli.project_id,
            metadata_host: cli.metadata_host,
            database: cli.db,
            log: LogConfig {
                level: cli.log_level,
                filter: cli.log_filter,
                format: cli.log_format,
            },
        }
        .with_port(cli.port)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServiceConfig::from(Cli::parse());

    // Init must fully succeed before the listener is bound.
    let state = bootstrap(&config).await?;

    server::serve(state, config.bind).await
}
