//! Tool availability probing
//!
//! Runs once at startup. Each check is independent; a failed probe marks the
//! tool unavailable for the lifetime of the process.

use std::time::Duration;
use tracing::{info, warn};

use crate::domain::capability::{CapabilityMatrix, ComposeTool};
use crate::infra::command::{CommandSpec, ProcessRunner};

/// Probe git, docker and the compose tool concurrently
pub async fn probe(runner: &dyn ProcessRunner, timeout: Duration) -> CapabilityMatrix {
    let (version_control_available, container_engine_available, compose_tool) = tokio::join!(
        probe_git(runner, timeout),
        probe_docker(runner, timeout),
        probe_compose(runner, timeout),
    );

    let matrix = CapabilityMatrix {
        version_control_available,
        container_engine_available,
        compose_tool,
    };

    if !matrix.version_control_available {
        warn!("Git is not available - deploy functionality will be limited");
    }
    if !matrix.container_engine_available {
        warn!("Docker is not available - Dockerfile deployments will fail");
    }
    if matrix.compose_tool.is_none() {
        warn!("Docker Compose is not available - docker-compose deployments will fail");
    }

    matrix
}

/// Run a version-style command, returning its trimmed stdout on success
async fn check(runner: &dyn ProcessRunner, spec: CommandSpec, timeout: Duration) -> Option<String> {
    match runner.run(&spec, timeout).await {
        Ok(output) if output.success => Some(output.stdout.trim().to_string()),
        Ok(output) => {
            warn!(command = %spec, code = ?output.code, stderr = %output.stderr.trim(), "Probe failed");
            None
        }
        Err(e) => {
            warn!(command = %spec, error = %e, "Probe failed");
            None
        }
    }
}

async fn probe_git(runner: &dyn ProcessRunner, timeout: Duration) -> bool {
    match check(runner, CommandSpec::new("git").arg("--version"), timeout).await {
        Some(version) => {
            info!(version = %version, "Git is available");
            true
        }
        None => false,
    }
}

async fn probe_docker(runner: &dyn ProcessRunner, timeout: Duration) -> bool {
    let Some(version) = check(runner, CommandSpec::new("docker").arg("--version"), timeout).await
    else {
        // No CLI binary, the daemon cannot be reached either
        return false;
    };
    info!(version = %version, "Docker CLI is available");

    let info = CommandSpec::new("docker").args(["info", "--format", "{{.ServerVersion}}"]);
    match check(runner, info, timeout).await {
        Some(server) => {
            info!(server_version = %server, "Docker daemon is accessible");
            true
        }
        None => {
            warn!("Docker daemon is not accessible, is the docker socket mounted?");
            false
        }
    }
}

async fn probe_compose(runner: &dyn ProcessRunner, timeout: Duration) -> Option<ComposeTool> {
    let standalone = CommandSpec::new("docker-compose").arg("--version");
    if let Some(version) = check(runner, standalone, timeout).await {
        info!(version = %version, "Docker Compose (standalone) is available");
        return Some(ComposeTool::Standalone);
    }

    let plugin = CommandSpec::new("docker").args(["compose", "version"]);
    if let Some(version) = check(runner, plugin, timeout).await {
        info!(version = %version, "Docker Compose (plugin) is available");
        return Some(ComposeTool::Plugin);
    }

    None
}
