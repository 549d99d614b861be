//! Zeph Infra - 仓库到容器的部署代理
//!
//! 接收仓库地址，拉取代码，按仓库根目录的 manifest 选择部署方式并启动容器

pub mod error;
pub mod infra;
pub mod domain;
pub mod config;
pub mod state;
pub mod api;
pub mod services;

use std::net::SocketAddr;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use config::env::{constants::VERSION, EnvConfig};
use infra::command::{CommandRunner, ProcessRunner};
use state::AppState;

/// 命令行覆盖的运行参数
#[derive(Debug, Clone, Default)]
pub struct RuntimeConfig {
    /// 覆盖 `PORT` 环境变量
    pub port_override: Option<u16>,
}

/// 初始化日志
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("zeph_infra=debug,tower_http=info"));

    // 可能已被测试或宿主进程初始化，忽略重复初始化
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}

/// 启动代理：加载配置、探测工具、启动 HTTP 服务，直到收到退出信号
pub async fn init_and_run_agent_with_config(runtime: RuntimeConfig) -> std::io::Result<()> {
    init_tracing();

    let mut config = EnvConfig::from_env();
    if let Some(port) = runtime.port_override {
        config.port = port;
    }

    tracing::info!(version = VERSION, "Starting zeph-infra deploy agent");

    tokio::fs::create_dir_all(&config.repos_dir).await?;
    tracing::info!(repos_dir = %config.repos_dir.display(), "Repos directory ready");

    let runner: Arc<dyn ProcessRunner> = Arc::new(CommandRunner);
    let capabilities = services::probe::probe(runner.as_ref(), config.timeouts.probe).await;

    let port = config.port;
    let state = Arc::new(AppState::new(config, capabilities, runner));
    let app = api::router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(addr = %addr, "Listening");
    tracing::info!("Deploy endpoint: POST http://localhost:{}/api/action", port);

    let shutdown = CancellationToken::new();
    tokio::spawn(watch_signals(shutdown.clone()));

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Ctrl-C / SIGTERM 时取消 token
async fn watch_signals(token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("Received Ctrl+C, shutting down"),
        () = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }

    token.cancel();
}
