//! Serve command - runs the caching proxy

use std::net::SocketAddr;

use clap::Args;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::api::create_router_with_state;
use crate::config::AppConfig;
use crate::infrastructure::logging;
use crate::infrastructure::observability::init_metrics;

/// Command line overrides applied on top of the loaded configuration
#[derive(Debug, Default, Args)]
pub struct ServeArgs {
    /// Address to bind
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(long)]
    pub port: Option<u16>,

    /// Initial embedding/verification provider (openai, mistral, claude)
    #[arg(long)]
    pub provider: Option<String>,
}

impl ServeArgs {
    fn apply(&self, config: &mut AppConfig) {
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(provider) = &self.provider {
            config.semantic.provider = provider.clone();
        }
    }
}

/// Run the caching proxy
pub async fn run(args: ServeArgs) -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let (mut config, load_error) = match AppConfig::load() {
        Ok(config) => (config, None),
        Err(e) => (AppConfig::default(), Some(e)),
    };
    args.apply(&mut config);

    logging::init_logging(&config.logging);
    if let Some(e) = load_error {
        warn!(error = %e, "Failed to load configuration, using defaults");
    }

    let prometheus = init_metrics(&config.metrics);
    let state = crate::create_app_state(&config, prometheus).await?;
    let app = create_router_with_state(state);

    let addr = build_socket_addr(&config)?;
    info!("Starting prompt cache on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn build_socket_addr(config: &AppConfig) -> anyhow::Result<SocketAddr> {
    Ok(SocketAddr::from((
        config.server.host.parse::<std::net::IpAddr>()?,
        config.server.port,
    )))
}
