//! 应用状态

use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::config::env::EnvConfig;
use crate::domain::capability::CapabilityMatrix;
use crate::infra::command::ProcessRunner;
use crate::services::deploy::Orchestrator;

/// 应用状态
pub struct AppState {
    /// 环境配置
    pub config: EnvConfig,
    /// 启动时探测的工具可用性（只读）
    pub capabilities: Arc<CapabilityMatrix>,
    /// 部署编排器
    pub orchestrator: Orchestrator,
    /// 服务启动时间
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// 创建新的应用状态
    ///
    /// `capabilities` 由启动流程探测一次后注入，运行期间不再变化
    pub fn new(
        config: EnvConfig,
        capabilities: CapabilityMatrix,
        runner: Arc<dyn ProcessRunner>,
    ) -> Self {
        let capabilities = Arc::new(capabilities);

        tracing::info!(
            port = config.port,
            repos_dir = %config.repos_dir.display(),
            name_prefix = %config.name_prefix,
            git = capabilities.version_control_available,
            docker = capabilities.container_engine_available,
            compose = ?capabilities.compose_tool.map(|t| t.command()),
            "Loaded configuration"
        );

        let orchestrator = Orchestrator::new(&config, capabilities.clone(), runner);

        Self {
            config,
            capabilities,
            orchestrator,
            started_at: Utc::now(),
        }
    }

    /// 运行时间（秒）
    pub fn uptime_secs(&self) -> i64 {
        (Utc::now() - self.started_at).num_seconds()
    }
}
