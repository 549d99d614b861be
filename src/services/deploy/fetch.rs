//! Repository fetching
//!
//! Produces a clean working copy: any previous directory with the same name
//! is removed before cloning, and the result must contain more than `.git`.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::domain::capability::CapabilityMatrix;
use crate::domain::deploy::WorkingCopy;
use crate::error::{DeployError, DeployErrorKind};
use crate::infra::command::{CommandError, CommandSpec, ProcessRunner};

/// Ordered fetch failure rules, matched case-insensitively; first match wins
const FETCH_ERROR_RULES: &[(&str, DeployErrorKind)] = &[
    ("enoent", DeployErrorKind::ToolUnavailable),
    ("command not found", DeployErrorKind::ToolUnavailable),
    ("not found", DeployErrorKind::RepositoryNotFound),
    ("does not exist", DeployErrorKind::RepositoryNotFound),
    ("does not appear to be a git repository", DeployErrorKind::RepositoryNotFound),
    ("permission denied", DeployErrorKind::AccessDenied),
    ("authentication", DeployErrorKind::AccessDenied),
    ("could not read username", DeployErrorKind::AccessDenied),
    ("could not read password", DeployErrorKind::AccessDenied),
];

/// Classify raw clone diagnostics into exactly one error kind
pub fn classify_fetch_error(detail: &str) -> DeployErrorKind {
    let lower = detail.to_lowercase();
    FETCH_ERROR_RULES
        .iter()
        .find(|(pattern, _)| lower.contains(pattern))
        .map(|(_, kind)| *kind)
        .unwrap_or(DeployErrorKind::FetchFailed)
}

/// Clones repositories into `repos_dir/<name>`
pub struct RepoFetcher {
    repos_dir: PathBuf,
    runner: Arc<dyn ProcessRunner>,
    timeout: Duration,
}

impl RepoFetcher {
    pub fn new(repos_dir: impl Into<PathBuf>, runner: Arc<dyn ProcessRunner>, timeout: Duration) -> Self {
        Self {
            repos_dir: repos_dir.into(),
            runner,
            timeout,
        }
    }

    pub fn target_dir(&self, name: &str) -> PathBuf {
        self.repos_dir.join(name)
    }

    /// Fetch `url` into a fresh working copy named `name`
    ///
    /// Callers must hold the workspace lock for `name`.
    pub async fn fetch(
        &self,
        capabilities: &CapabilityMatrix,
        url: &str,
        name: &str,
    ) -> Result<WorkingCopy, DeployError> {
        if !capabilities.version_control_available {
            return Err(DeployError::tool_unavailable(
                "Git is not installed or not available. Please ensure Git is installed.",
            ));
        }

        let path = self.target_dir(name);
        info!(url = %url, name = %name, path = %path.display(), "Cloning repository");

        let exists = tokio::fs::try_exists(&path).await.map_err(|e| {
            DeployError::fetch_failed(format!(
                "Failed to inspect existing directory {}: {}",
                path.display(),
                e
            ))
        })?;
        if exists {
            info!(path = %path.display(), "Removing existing working copy");
            tokio::fs::remove_dir_all(&path).await.map_err(|e| {
                DeployError::fetch_failed(format!(
                    "Failed to remove existing directory {}: {}",
                    path.display(),
                    e
                ))
            })?;
        }
        tokio::fs::create_dir_all(&self.repos_dir).await.map_err(|e| {
            DeployError::fetch_failed(format!(
                "Failed to create repos directory {}: {}",
                self.repos_dir.display(),
                e
            ))
        })?;

        let spec = CommandSpec::new("git")
            .args(["clone", "--"])
            .arg(url)
            .arg(path.to_string_lossy())
            .env("GIT_TERMINAL_PROMPT", "0");

        let output = match self.runner.run(&spec, self.timeout).await {
            Ok(output) => output,
            Err(e) => return Err(command_error(url, e)),
        };
        if !output.success {
            let detail = output.diagnostics();
            let kind = classify_fetch_error(&detail);
            warn!(url = %url, kind = %kind, code = ?output.code, "Clone failed");
            return Err(DeployError::new(kind, describe(kind, url, &detail)));
        }

        let entries = count_entries(&path).await.map_err(|e| {
            DeployError::fetch_failed(format!("Failed to read working copy {}: {}", path.display(), e))
        })?;
        if entries == 0 {
            return Err(DeployError::fetch_failed(format!(
                "Clone of {} produced an empty working copy",
                url
            )));
        }

        info!(
            name = %name,
            entries = entries,
            elapsed_ms = output.elapsed.as_millis() as u64,
            "Repository cloned"
        );

        Ok(WorkingCopy {
            name: name.to_string(),
            path,
            entries,
        })
    }
}

fn command_error(url: &str, err: CommandError) -> DeployError {
    if err.is_missing_executable() {
        return DeployError::tool_unavailable(
            "Git is not installed or not available. Please ensure Git is installed and accessible.",
        );
    }
    match err {
        CommandError::Timeout(d) => DeployError::fetch_failed(format!(
            "Clone of {} timed out after {}s",
            url,
            d.as_secs()
        )),
        other => {
            let detail = other.to_string();
            let kind = classify_fetch_error(&detail);
            DeployError::new(kind, describe(kind, url, &detail))
        }
    }
}

fn describe(kind: DeployErrorKind, url: &str, detail: &str) -> String {
    match kind {
        DeployErrorKind::RepositoryNotFound => {
            format!("Repository not found or does not exist: {}\n{}", url, detail)
        }
        DeployErrorKind::AccessDenied => format!(
            "Permission denied or authentication failed for repository: {}\n{}",
            url, detail
        ),
        DeployErrorKind::ToolUnavailable => {
            format!("Git is not installed or not available: {}", detail)
        }
        _ => format!("Failed to clone repository: {}", detail),
    }
}

/// Root entries of the working copy, ignoring `.git`
async fn count_entries(path: &Path) -> std::io::Result<usize> {
    let mut dir = tokio::fs::read_dir(path).await?;
    let mut count = 0;
    while let Some(entry) = dir.next_entry().await? {
        if entry.file_name() != ".git" {
            count += 1;
        }
    }
    Ok(count)
}
