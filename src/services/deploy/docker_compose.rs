//! Docker Compose deployment execution
//!
//! Runs `up -d --build` in the working copy, with the compose project scoped
//! to the generated deployment name so repeated deployments never touch
//! unrelated stacks. Passing `-f` disables compose's own override lookup, so
//! the resolved override file is passed explicitly after the manifest.

use crate::domain::capability::CapabilityMatrix;
use crate::domain::deploy::{DeployMethod, DeployStage, DeploymentDescriptor, DeploymentStrategy};
use crate::error::DeployError;
use crate::infra::command::CommandSpec;

use super::context::DeployContext;

/// Execute a Docker Compose deployment under the pre-generated `name`
pub async fn execute(
    ctx: &DeployContext,
    capabilities: &CapabilityMatrix,
    strategy: &DeploymentStrategy,
    name: String,
) -> Result<DeploymentDescriptor, DeployError> {
    let Some(tool) = capabilities.compose_tool else {
        tracing::error!(request_id = %ctx.request_id, "Docker Compose is not available - cannot deploy with docker-compose");
        return Err(DeployError::tool_unavailable(
            "Docker Compose is not installed or not available. Please ensure Docker Compose is installed on the host machine.",
        ));
    };

    let work_dir = &strategy.working_dir;
    let compose_file = strategy
        .manifest
        .file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_else(|| super::resolve::COMPOSE_FILES[0].to_string());
    let override_file = strategy
        .override_manifest
        .as_ref()
        .and_then(|p| p.file_name())
        .map(|f| f.to_string_lossy().into_owned());

    tracing::info!(
        request_id = %ctx.request_id,
        project = %name,
        compose_file = %compose_file,
        override_file = ?override_file,
        command = tool.command(),
        work_dir = %work_dir.display(),
        "Starting Docker Compose deployment"
    );

    let mut stages = vec![DeployStage::new("compose_up")];

    let mut up = CommandSpec::new(tool.program())
        .args(tool.base_args().iter().copied())
        .args(["-f", compose_file.as_str()]);
    if let Some(ref file) = override_file {
        up = up.args(["-f", file.as_str()]);
    }
    let up = up
        .args(["-p", name.as_str()])
        .args(["up", "-d", "--build"])
        .current_dir(work_dir)
        .env("COMPOSE_PROJECT_NAME", name.as_str());
    let output = ctx.run_stage(&mut stages[0], up, ctx.timeouts.build).await?;

    let elapsed_ms = output.elapsed.as_millis() as u64;
    tracing::info!(
        request_id = %ctx.request_id,
        project = %name,
        elapsed_ms = elapsed_ms,
        "Docker Compose deployment finished"
    );

    Ok(DeploymentDescriptor {
        method: DeployMethod::ComposeBased,
        project_name: Some(name.clone()),
        name,
        path: work_dir.clone(),
        elapsed_ms,
        compose_command: Some(tool.command().to_string()),
        image_name: None,
        container_id: None,
        stages,
    })
}
