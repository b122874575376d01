use std::{net::SocketAddr, path::PathBuf};

use clap::Parser;
use eyre::WrapErr;
use loyalty_server::{app, AppState, Config};
use poem::{listener::TcpListener, Server};
use tracing_subscriber::EnvFilter;

/// Loyalty program leaderboard and pass service.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Path to the config file.
    #[arg(long, short, env = "LOYALTY_CONFIG")]
    config: Option<PathBuf>,
    /// Address to listen on, overriding the config.
    #[arg(long)]
    listen: Option<SocketAddr>,
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(tracing::level_filters::LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .init();

    let cli = Cli::parse();
    let mut config = Config::load(cli.config.as_deref()).wrap_err("failed to load config")?;
    if let Some(listen) = cli.listen {
        config.listen = listen;
    }

    let state = AppState::from_config(&config)?;
    tracing::info!(listen = %config.listen, bridge = %config.bridge_url, "starting server");
    Server::new(TcpListener::bind(config.listen))
        .run(app(state))
        .await?;
    Ok(())
}
