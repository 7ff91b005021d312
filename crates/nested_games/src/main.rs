//! Nested Games - console CLI
//!
//! Hosts, joins or plays a local nested tic-tac-toe match.

#![warn(missing_docs)]

use anyhow::Result;
use clap::Parser;
use nested_games::{Cli, Command, GameConfig, app};
use nested_sync::{LoopbackTransport, Role, SessionConfig, TcpTransport};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config =
        GameConfig::load(cli.config.as_deref())?.with_overrides(cli.command.port(), cli.force_turn);

    // Logs go to stderr; stdout belongs to the board.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.log_filter())),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Host { .. } => run_host(&config).await,
        Command::Join { address, .. } => {
            let address = address.unwrap_or_else(|| config.host_address().clone());
            run_join(&config, &address).await
        }
        Command::Local => run_local(&config).await,
    }
}

/// Host a match on the configured port
async fn run_host(config: &GameConfig) -> Result<()> {
    info!(port = config.port(), "Starting host");
    println!("Waiting for a peer on port {}...", config.port());
    let transport = TcpTransport::host(*config.port()).await?;
    println!("Peer connected. You play A.");

    let session = SessionConfig::new(Role::Host).with_force_turn(*config.force_turn());
    app::run(session, transport).await
}

/// Join a hosted match
async fn run_join(config: &GameConfig, address: &str) -> Result<()> {
    info!(address, port = config.port(), "Joining host");
    let transport = TcpTransport::join(address, *config.port()).await?;
    println!("Connected to {address}:{}. You play B.", config.port());

    let session = SessionConfig::new(Role::Peer).with_force_turn(*config.force_turn());
    app::run(session, transport).await
}

/// Both seats on this console
async fn run_local(config: &GameConfig) -> Result<()> {
    info!("Starting local match");
    let session = SessionConfig::new(Role::Host)
        .with_hotseat(true)
        .with_force_turn(*config.force_turn());
    app::run(session, LoopbackTransport::solo(Role::Host)).await
}
