//! tiktaktok - WebSocket tic-tac-toe server.

#![warn(missing_docs)]

mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Command};
use std::path::PathBuf;
use tiktaktok_server::{AppState, ServerConfig, serve};
use tokio::net::TcpListener;
use tracing::{info, instrument, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info,tiktaktok_server=debug,tiktaktok_game=debug";

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve { config, host, port } => run_server(config, host, port).await,
        Command::CheckConfig { config } => check_config(config),
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER)),
        )
        .init();
}

fn load_config(
    path: Option<PathBuf>,
    host: Option<String>,
    port: Option<u16>,
) -> Result<ServerConfig> {
    let config = ServerConfig::load(path.as_deref())?.with_overrides(host, port);
    config.validate()?;
    Ok(config)
}

/// Run the WebSocket server until Ctrl-C
#[instrument(skip_all)]
async fn run_server(path: Option<PathBuf>, host: Option<String>, port: Option<u16>) -> Result<()> {
    init_tracing();

    let config = load_config(path, host, port)?;
    let listener = TcpListener::bind(config.bind_address()).await?;
    info!(
        addr = %listener.local_addr()?,
        path = %config.ws_path(),
        "Server ready"
    );

    serve(listener, AppState::new(config), shutdown_signal()).await?;
    Ok(())
}

/// Print the effective configuration
fn check_config(path: Option<PathBuf>) -> Result<()> {
    let config = load_config(path, None, None)?;
    println!("{}", toml::to_string_pretty(&config)?);
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown requested"),
        Err(e) => {
            warn!(error = %e, "Cannot listen for Ctrl-C, running until killed");
            std::future::pending::<()>().await;
        }
    }
}
