//! Admin authentication gateway.
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌──────────────────────────────────────────────────┐
//!                      │                 ADMIN GATEWAY                     │
//!   Browser request    │  ┌─────────┐   ┌──────────┐   ┌───────────────┐  │
//!   ───────────────────┼─▶│  http   │──▶│  relay   │──▶│   upstream    │──┼──▶ Backend
//!                      │  │ server  │   │ endpoint │   │ AuthorityClient│  │    authority
//!                      │  └─────────┘   └────┬─────┘   └───────────────┘  │
//!                      │                     │ Set-Cookie / body token     │
//!                      │                     ▼                             │
//!   Browser response   │               ┌──────────┐                        │
//!   ◀──────────────────┼───────────────│ cookies  │ HttpOnly, Lax, Path=/  │
//!                      │               └──────────┘                        │
//!                      │  config · security · observability · lifecycle    │
//!                      └──────────────────────────────────────────────────┘
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use admin_gateway::config::loader::{read_config, ConfigError};
use admin_gateway::config::validation::validate_config;
use admin_gateway::config::{DeploymentMode, GatewayConfig};
use admin_gateway::lifecycle::{signals, Shutdown};
use admin_gateway::observability::{logging, metrics};
use admin_gateway::GatewayServer;

#[derive(Parser)]
#[command(name = "admin-gateway")]
#[command(about = "Relays admin authentication to a backend authority", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Deployment mode (production or development).
    #[arg(short, long)]
    mode: Option<DeploymentMode>,

    /// Backend authority base URL, overriding the per-mode address.
    #[arg(long)]
    backend_url: Option<String>,

    /// Listener bind address.
    #[arg(short, long)]
    bind: Option<String>,
}

impl Cli {
    fn load(&self) -> Result<GatewayConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => read_config(path)?,
            None => GatewayConfig::default(),
        };

        if let Some(mode) = self.mode {
            config.upstream.mode = mode;
        }
        if let Some(url) = &self.backend_url {
            config.upstream.base_url = Some(url.clone());
        }
        if let Some(bind) = &self.bind {
            config.listener.bind_address = bind.clone();
        }

        validate_config(&config).map_err(ConfigError::Validation)?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = cli.load()?;

    logging::init_logging(&config.observability);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        bind_address = %config.listener.bind_address,
        mode = %config.upstream.mode,
        upstream_timeout_secs = config.upstream.timeout_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let server = GatewayServer::new(config)?;

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    signals::spawn_signal_listener(shutdown);

    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
