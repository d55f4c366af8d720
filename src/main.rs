//! HTTP server for the evaluation engine.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use evaluation_engine::api::{AppState, create_router};
use evaluation_engine::config::ConfigLoader;

/// Work-rate, payout and approval API server.
#[derive(Debug, Parser)]
#[command(name = "evaluation-engine", version, about)]
struct Cli {
    /// Directory holding grading_scale.yaml, attendance_types.yaml and holidays/.
    #[arg(long, env = "EVAL_CONFIG_DIR", default_value = "./config/default")]
    config_dir: PathBuf,

    /// Address to listen on.
    #[arg(long, env = "EVAL_BIND", default_value = "0.0.0.0:3000")]
    bind: SocketAddr,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let config = ConfigLoader::load(&cli.config_dir)?;
    let router = create_router(AppState::new(config));

    let listener = tokio::net::TcpListener::bind(cli.bind).await?;
    info!(address = %cli.bind, config_dir = %cli.config_dir.display(), "Evaluation engine listening");
    axum::serve(listener, router).await?;

    Ok(())
}
