//! restart-compose - GitHub webhook 触发的 docker compose 重启服务
//!
//! 收到默认分支的 push 后，找出被修改的 compose 文件对应的 stack，
//! 依次停止、`git pull`、再启动

pub mod error;
pub mod middleware;
pub mod infra;
pub mod domain;
pub mod config;
pub mod state;
pub mod api;
pub mod services;

#[cfg(test)]
mod testing;

use anyhow::Context;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::config::{stacks, EnvConfig};
use crate::infra::{DockerCompose, GitUpdater, ListenerProvider, TcpListenerProvider};
use crate::state::{AppState, StackRegistry};

/// 运行时配置（来自命令行）
#[derive(Clone, Debug, Default)]
pub struct RuntimeConfig {
    /// 配置文件所在目录，默认为当前目录
    pub dir: Option<PathBuf>,
    /// 监听地址
    pub host: String,
    /// 覆盖 `PORT` 环境变量
    pub port_override: Option<u16>,
}

/// 初始化并运行服务，直到收到 Ctrl-C / SIGTERM
pub async fn run(config: RuntimeConfig) -> anyhow::Result<()> {
    info!(version = crate::config::env::constants::VERSION, "Starting restart-compose");

    let env = EnvConfig::from_env();

    let config_path = stacks::find(config.dir.as_deref()).context("Failed to locate configuration")?;
    let loaded = stacks::load(&config_path).context("Failed to load configuration")?;
    info!(
        path = %loaded.path.display(),
        stacks = loaded.stacks.len(),
        "Configuration loaded"
    );

    let compose = DockerCompose::connect()
        .await
        .context("Failed to connect to Docker")?;

    let registry = StackRegistry::from_config(&loaded);
    let state = Arc::new(AppState::new(
        env.webhook_secret.clone(),
        registry,
        Arc::new(compose),
        Arc::new(GitUpdater),
    ));

    let inventory = state
        .registry
        .inventory(state.compose.as_ref(), &state.shutdown)
        .await;
    info!(
        configured = inventory.len(),
        present = inventory.iter().filter(|s| s.exists).count(),
        "Stacks registered"
    );

    let port = config.port_override.unwrap_or(env.port);
    let provider = TcpListenerProvider::new(config.host.clone(), port, env.public_url.clone());
    let listener = provider
        .listen()
        .await
        .with_context(|| format!("Failed to bind to {}:{}", config.host, port))?;

    info!(
        addr = %listener.listener.local_addr().context("Failed to read local address")?,
        "Listening"
    );
    info!(url = %format!("{}/github", listener.public_url), "Webhook URL");

    let app = api::router(state.clone());
    axum::serve(listener.listener, app)
        .with_graceful_shutdown(shutdown_signal(state.shutdown.clone()))
        .await
        .context("HTTP server failed")?;

    info!("Shut down");
    Ok(())
}

/// 等待退出信号，并取消所有进行中的请求
async fn shutdown_signal(token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }

    token.cancel();
}
