//! Dockerfile deployment execution
//!
//! Builds an image from the working copy's Dockerfile, creates a container
//! from it (no published ports, stdout/stderr attached) and starts it.

use crate::domain::capability::CapabilityMatrix;
use crate::domain::deploy::{DeployMethod, DeployStage, DeploymentDescriptor, DeploymentStrategy};
use crate::error::DeployError;
use crate::infra::command::CommandSpec;

use super::context::DeployContext;
use super::naming::NameGenerator;

/// Execute a Dockerfile deployment under the pre-generated `name`
pub async fn execute(
    ctx: &DeployContext,
    capabilities: &CapabilityMatrix,
    strategy: &DeploymentStrategy,
    name: String,
    names: &NameGenerator,
) -> Result<DeploymentDescriptor, DeployError> {
    if !capabilities.container_engine_available {
        tracing::error!(request_id = %ctx.request_id, "Docker is not available - cannot deploy with Dockerfile");
        return Err(DeployError::tool_unavailable(
            "Docker is not installed or not available. Please ensure Docker is installed and the daemon is reachable.",
        ));
    }

    let image_name = names.image_name();
    let work_dir = &strategy.working_dir;
    let dockerfile = strategy
        .manifest
        .file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_else(|| super::resolve::DOCKERFILE.to_string());

    tracing::info!(
        request_id = %ctx.request_id,
        name = %name,
        image = %image_name,
        work_dir = %work_dir.display(),
        "Starting Dockerfile deployment"
    );

    let mut stages = vec![
        DeployStage::new("docker_build"),
        DeployStage::new("container_create"),
        DeployStage::new("container_start"),
    ];

    // Stage 1: docker build
    let build = CommandSpec::new("docker")
        .args([
            "build",
            "--progress=plain",
            "-t",
            image_name.as_str(),
            "-f",
            dockerfile.as_str(),
            ".",
        ])
        .current_dir(work_dir);
    ctx.run_stage(&mut stages[0], build, ctx.timeouts.build).await?;
    tracing::info!(request_id = %ctx.request_id, image = %image_name, "✓ Image built");

    // Stage 2: docker create
    let create = CommandSpec::new("docker")
        .args([
            "create",
            "--name",
            name.as_str(),
            "--attach",
            "stdout",
            "--attach",
            "stderr",
            image_name.as_str(),
        ])
        .current_dir(work_dir);
    let created = ctx.run_stage(&mut stages[1], create, ctx.timeouts.start).await?;
    let container_id = created
        .stdout
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .last()
        .map(str::to_string)
        .ok_or_else(|| {
            DeployError::deployment_failed(format!(
                "`docker create` returned no container id:\n{}",
                created.diagnostics()
            ))
        })?;

    // Stage 3: docker start
    let start = CommandSpec::new("docker")
        .args(["start", container_id.as_str()])
        .current_dir(work_dir);
    ctx.run_stage(&mut stages[2], start, ctx.timeouts.start).await?;

    let elapsed_ms = stages
        .iter()
        .filter_map(|s| s.duration_ms)
        .sum::<i64>()
        .max(0) as u64;

    tracing::info!(
        request_id = %ctx.request_id,
        name = %name,
        container_id = %container_id,
        elapsed_ms = elapsed_ms,
        "Dockerfile deployment finished"
    );

    Ok(DeploymentDescriptor {
        method: DeployMethod::DockerfileBased,
        name,
        path: work_dir.clone(),
        elapsed_ms,
        project_name: None,
        compose_command: None,
        image_name: Some(image_name),
        container_id: Some(container_id),
        stages,
    })
}
