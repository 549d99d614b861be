//! 容器部署器
//!
//! 先生成唯一部署名，再按部署方式分派到 compose 或 Dockerfile 执行路径

use std::sync::Arc;

use crate::domain::capability::CapabilityMatrix;
use crate::domain::deploy::{DeployMethod, DeploymentDescriptor, DeploymentStrategy};
use crate::error::DeployError;

use super::context::DeployContext;
use super::naming::NameGenerator;
use super::{docker_build, docker_compose};

pub struct ContainerDeployer {
    names: Arc<NameGenerator>,
}

impl ContainerDeployer {
    pub fn new(names: Arc<NameGenerator>) -> Self {
        Self { names }
    }

    /// 部署已解析的工作副本
    pub async fn deploy(
        &self,
        ctx: &DeployContext,
        capabilities: &CapabilityMatrix,
        strategy: &DeploymentStrategy,
    ) -> Result<DeploymentDescriptor, DeployError> {
        let name = self.names.deployment_name();
        tracing::info!(
            request_id = %ctx.request_id,
            method = strategy.method.as_str(),
            name = %name,
            "Dispatching deployment"
        );

        match strategy.method {
            DeployMethod::ComposeBased => {
                docker_compose::execute(ctx, capabilities, strategy, name).await
            }
            DeployMethod::DockerfileBased => {
                docker_build::execute(ctx, capabilities, strategy, name, &self.names).await
            }
        }
    }
}
