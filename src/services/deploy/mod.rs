//! 部署服务模块
//!
//! 编排入口：Fetch → Resolve → Deploy，按顺序执行，首个失败即返回

pub mod context;
pub mod deployer;
pub mod docker_build;
pub mod docker_compose;
pub mod fetch;
pub mod naming;
pub mod resolve;

use std::sync::Arc;
use std::time::Instant;

use crate::config::{EnvConfig, Timeouts};
use crate::domain::action::{ActionRequest, ActionResponse, DEPLOY_ACTION};
use crate::domain::capability::CapabilityMatrix;
use crate::domain::deploy::DeploymentDescriptor;
use crate::error::{ActionFailure, DeployError};
use crate::infra::command::ProcessRunner;
use crate::state::workspace_locks::WorkspaceLocks;

pub use context::DeployContext;
pub use deployer::ContainerDeployer;
pub use fetch::RepoFetcher;
pub use naming::NameGenerator;

/// 部署编排器
///
/// 持有启动时探测的能力矩阵（只读）和所有执行组件；每个请求独立运行，
/// 同名工作副本的请求在整个流水线期间串行
pub struct Orchestrator {
    capabilities: Arc<CapabilityMatrix>,
    runner: Arc<dyn ProcessRunner>,
    fetcher: RepoFetcher,
    deployer: ContainerDeployer,
    names: Arc<NameGenerator>,
    locks: WorkspaceLocks,
    timeouts: Timeouts,
}

impl Orchestrator {
    pub fn new(
        config: &EnvConfig,
        capabilities: Arc<CapabilityMatrix>,
        runner: Arc<dyn ProcessRunner>,
    ) -> Self {
        let names = Arc::new(NameGenerator::new(config.name_prefix.clone()));
        Self {
            capabilities,
            fetcher: RepoFetcher::new(
                config.repos_dir.clone(),
                runner.clone(),
                config.timeouts.clone,
            ),
            deployer: ContainerDeployer::new(names.clone()),
            runner,
            names,
            locks: WorkspaceLocks::new(),
            timeouts: config.timeouts.clone(),
        }
    }

    /// 正在执行（或等待锁）的工作副本数量
    pub async fn active_deployments(&self) -> usize {
        self.locks.active_count().await
    }

    /// 处理一个动作请求
    ///
    /// 关联 ID 在任何工作之前分配；非 deploy 动作直接回显
    pub async fn dispatch(&self, request: ActionRequest) -> Result<ActionResponse, ActionFailure> {
        let request_id = naming::request_id();
        let ActionRequest { action, link } = request;

        let fail = |error: DeployError, action: Option<String>, link: Option<String>| ActionFailure {
            request_id: request_id.clone(),
            action,
            link,
            error,
        };

        let Some(action) = action.filter(|a| !a.trim().is_empty()) else {
            tracing::warn!(request_id = %request_id, "Rejected request without action");
            return Err(fail(
                DeployError::invalid_request(r#"Missing "action" field in request body"#),
                None,
                link,
            ));
        };

        if action != DEPLOY_ACTION {
            tracing::info!(request_id = %request_id, action = %action, "Action received");
            return Ok(ActionResponse::acknowledged(request_id, action));
        }

        let trimmed = link
            .as_deref()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string);
        let Some(link) = trimmed else {
            tracing::warn!(request_id = %request_id, "Rejected deploy without link");
            return Err(fail(
                DeployError::invalid_request(r#"Missing "link" field for deploy action"#),
                Some(action),
                link,
            ));
        };
        if link.starts_with('-') {
            return Err(fail(
                DeployError::invalid_request(format!("Invalid repository link: {}", link)),
                Some(action),
                Some(link),
            ));
        }

        let started = Instant::now();
        match self.deploy(&request_id, &link).await {
            Ok(descriptor) => {
                let total_time = started.elapsed().as_millis() as u64;
                tracing::info!(
                    request_id = %request_id,
                    method = descriptor.method.as_str(),
                    name = %descriptor.name,
                    total_time_ms = total_time,
                    "Deployment completed successfully"
                );
                Ok(ActionResponse::deployed(request_id, link, descriptor, total_time))
            }
            Err(error) => {
                tracing::error!(
                    request_id = %request_id,
                    link = %link,
                    kind = %error.kind,
                    "Deployment failed"
                );
                Err(fail(error, Some(action), Some(link)))
            }
        }
    }

    /// Fetch → Resolve → Deploy
    ///
    /// 工作副本锁覆盖整个流程；失败时工作副本保留在原地供排查
    pub async fn deploy(
        &self,
        request_id: &str,
        link: &str,
    ) -> Result<DeploymentDescriptor, DeployError> {
        let name = naming::derive_repo_name(link).unwrap_or_else(|| self.names.fallback_repo_name());
        tracing::info!(request_id = %request_id, link = %link, name = %name, "Processing deploy action");

        let _guard = self.locks.acquire(&name).await;

        let working_copy = self.fetcher.fetch(&self.capabilities, link, &name).await?;
        let strategy = resolve::resolve(&working_copy).await?;

        let ctx = DeployContext {
            request_id: request_id.to_string(),
            runner: self.runner.clone(),
            timeouts: self.timeouts.clone(),
        };
        self.deployer.deploy(&ctx, &self.capabilities, &strategy).await
    }
}
