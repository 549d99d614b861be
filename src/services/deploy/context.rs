//! 部署上下文
//!
//! 单次部署请求的执行上下文：关联 ID、命令执行器和超时配置

use std::sync::Arc;
use std::time::Duration;

use crate::config::Timeouts;
use crate::domain::deploy::DeployStage;
use crate::error::DeployError;
use crate::infra::command::{CommandError, CommandOutput, CommandSpec, ProcessRunner};

/// 部署执行上下文
#[derive(Clone)]
pub struct DeployContext {
    /// 请求关联 ID
    pub request_id: String,
    /// 命令执行器
    pub runner: Arc<dyn ProcessRunner>,
    /// 超时配置
    pub timeouts: Timeouts,
}

impl DeployContext {
    /// 在阶段内执行命令
    ///
    /// 非零退出、超时或启动失败都会转换为 `DeployError`，诊断输出原样保留
    pub async fn run_stage(
        &self,
        stage: &mut DeployStage,
        spec: CommandSpec,
        timeout: Duration,
    ) -> Result<CommandOutput, DeployError> {
        stage.start();
        tracing::info!(request_id = %self.request_id, stage = %stage.name, command = %spec, "Stage started");

        let result = self.runner.run(&spec, timeout).await;
        let success = matches!(result, Ok(ref output) if output.success);
        stage.finish(success);

        match result {
            Ok(output) => {
                if !output.stdout.trim().is_empty() {
                    tracing::debug!(request_id = %self.request_id, stage = %stage.name, stdout = %output.stdout.trim_end(), "Command stdout");
                }
                if !output.stderr.trim().is_empty() {
                    tracing::debug!(request_id = %self.request_id, stage = %stage.name, stderr = %output.stderr.trim_end(), "Command stderr");
                }

                if output.success {
                    tracing::info!(
                        request_id = %self.request_id,
                        stage = %stage.name,
                        duration_ms = ?stage.duration_ms,
                        "Stage finished"
                    );
                    Ok(output)
                } else {
                    tracing::error!(
                        request_id = %self.request_id,
                        stage = %stage.name,
                        code = ?output.code,
                        "Stage failed"
                    );
                    let code = output
                        .code
                        .map(|c| c.to_string())
                        .unwrap_or_else(|| "signal".to_string());
                    Err(DeployError::deployment_failed(format!(
                        "`{}` failed with exit code {}:\n{}",
                        spec,
                        code,
                        output.diagnostics()
                    )))
                }
            }
            Err(e) => {
                tracing::error!(request_id = %self.request_id, stage = %stage.name, error = %e, "Stage failed");
                Err(stage_error(&spec, e))
            }
        }
    }
}

fn stage_error(spec: &CommandSpec, err: CommandError) -> DeployError {
    if err.is_missing_executable() {
        return DeployError::tool_unavailable(format!("`{}` is not installed or not available", spec.program));
    }
    match err {
        CommandError::Timeout(d) => DeployError::deployment_failed(format!(
            "`{}` timed out after {}s",
            spec,
            d.as_secs()
        )),
        other => DeployError::deployment_failed(format!("`{}`: {}", spec, other)),
    }
}
