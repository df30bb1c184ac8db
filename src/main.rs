//! Calendar proxy.
//!
//! ```text
//! GET /soccer/premier_league/mancity.ics
//!     → GET <origin>/soccer/premier_league/mancity.ics
//!     → 2xx: same status and body, text/calendar attachment "mancity.ics"
//!     → otherwise: 404 "Not found"
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use calendar_proxy::config::{read_config, validate_config, ConfigError, ProxyConfig};
use calendar_proxy::lifecycle::{spawn_signal_listener, Shutdown};
use calendar_proxy::observability::init_logging;
use calendar_proxy::HttpServer;

#[derive(Parser, Debug)]
#[command(name = "calendar-proxy")]
#[command(version, about = "Serve team calendars from a fixed origin as .ics downloads", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long, env = "CALENDAR_PROXY_CONFIG")]
    config: Option<PathBuf>,

    /// Listen address, overrides listener.bind_address
    #[arg(short, long)]
    bind: Option<String>,

    /// Origin base URL, overrides origin.base_url
    #[arg(short, long)]
    origin: Option<String>,

    /// Log level, overrides observability.log_level
    #[arg(long)]
    log_level: Option<String>,
}

impl Cli {
    /// Merge file configuration and flags, then validate the result once.
    fn into_config(self) -> Result<ProxyConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => read_config(path)?,
            None => ProxyConfig::default(),
        };

        if let Some(bind) = self.bind {
            config.listener.bind_address = bind;
        }
        if let Some(origin) = self.origin {
            config.origin.base_url = origin;
        }
        if let Some(level) = self.log_level {
            config.observability.log_level = level;
        }

        validate_config(&config).map_err(ConfigError::Validation)?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Cli::parse().into_config()?;

    init_logging(&config.observability.log_level);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        bind_address = %config.listener.bind_address,
        origin = %config.origin.base_url,
        connect_timeout_secs = config.timeouts.connect_secs,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    spawn_signal_listener(shutdown);

    let server = HttpServer::new(config)?;
    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
