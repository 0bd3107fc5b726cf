//! restart-compose - GitHub webhook 触发的 docker compose 重启服务
//!
//! Usage:
//! - Current directory: `restart-compose`
//! - Explicit config directory: `restart-compose -d /srv/infra`
//! - Custom port: `restart-compose --port 19876`

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use restart_compose::RuntimeConfig;

/// Restart docker compose stacks when their files change on the default branch
#[derive(Parser)]
#[command(name = "restart-compose")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Directory containing .restart-compose.yaml (defaults to the current directory)
    #[arg(short, long, env = "RESTART_COMPOSE_DIR", value_name = "DIR")]
    dir: Option<PathBuf>,

    /// Listen address
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    host: String,

    /// Listen port, overrides PORT (default: 9876)
    #[arg(long)]
    port: Option<u16>,

    /// Log level, overridden by RUST_LOG
    #[arg(long, env = "RESTART_COMPOSE_LOG_LEVEL", default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(&cli.log_level)?;

    restart_compose::run(RuntimeConfig {
        dir: cli.dir,
        host: cli.host,
        port_override: cli.port,
    })
    .await
}

fn init_logging(level: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(level))
        .context("Failed to create log filter")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();

    Ok(())
}
