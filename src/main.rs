use clap::Parser;
use std::{net::SocketAddr, path::PathBuf};
use tracing_subscriber::EnvFilter;

use cityweather::{run_server, Config};

/// In-memory per-city weather observation service.
#[derive(Debug, Parser)]
#[command(name = "cityweather", version, about)]
struct Cli {
    /// Path to a TOML config file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to listen on, e.g. 0.0.0.0:8080.
    #[arg(short, long)]
    bind: Option<SocketAddr>,

    /// Log filter used when RUST_LOG is unset, e.g. "debug" or "cityweather=trace".
    #[arg(long)]
    log: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    }
    .with_overrides(cli.bind, cli.log);

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_filter)),
        )
        .init();

    run_server(config).await?;
    Ok(())
}
