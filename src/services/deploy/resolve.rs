//! Deployment method resolution
//!
//! Only the working-copy root is authoritative. A compose manifest always
//! wins over a Dockerfile.

use std::path::{Path, PathBuf};
use tracing::info;

use crate::domain::deploy::{DeployMethod, DeploymentStrategy, WorkingCopy};
use crate::error::DeployError;

/// Single-image build recipe
pub const DOCKERFILE: &str = "Dockerfile";

/// Multi-service manifests, in lookup order
pub const COMPOSE_FILES: &[&str] = &[
    "docker-compose.yml",
    "docker-compose.yaml",
    "compose.yml",
    "compose.yaml",
];

/// Compose override files
pub const OVERRIDE_FILES: &[&str] = &[
    "compose.override.yml",
    "compose.override.yaml",
    "docker-compose.override.yml",
    "docker-compose.override.yaml",
];

/// Select the deployment strategy for a working copy
pub async fn resolve(working_copy: &WorkingCopy) -> Result<DeploymentStrategy, DeployError> {
    let root = &working_copy.path;

    let dockerfile = existing_file(root, &[DOCKERFILE]).await;
    let compose = existing_file(root, COMPOSE_FILES).await;

    info!(
        name = %working_copy.name,
        dockerfile = dockerfile.is_some(),
        compose = compose.is_some(),
        "Checked deployment manifests"
    );

    let override_manifest = match &compose {
        Some(compose) => override_for(compose).await,
        None => None,
    };

    let (method, manifest) = match (dockerfile, compose) {
        (_, Some(compose)) => (DeployMethod::ComposeBased, compose),
        (Some(dockerfile), None) => (DeployMethod::DockerfileBased, dockerfile),
        (None, None) => {
            return Err(DeployError::no_manifest(format!(
                "Neither Dockerfile nor docker-compose.yml found in {}. At least one is required for deployment.",
                root.display()
            )));
        }
    };

    info!(
        name = %working_copy.name,
        method = method.as_str(),
        manifest = %manifest.display(),
        override_manifest = ?override_manifest,
        "Deployment method selected"
    );

    Ok(DeploymentStrategy {
        method,
        working_dir: root.clone(),
        manifest,
        override_manifest,
    })
}

/// Override file merged with a compose manifest
///
/// Compose merges a single override; names matching the manifest's family and
/// extension come first (`docker-compose.yml` -> `docker-compose.override.yml`).
async fn override_for(manifest: &Path) -> Option<PathBuf> {
    let root = manifest.parent()?;
    let stem = manifest.file_stem()?.to_str()?;
    let ext = manifest.extension()?.to_str()?;

    let mut candidates: Vec<String> = vec![
        format!("{}.override.{}", stem, ext),
        format!("{}.override.{}", stem, if ext == "yml" { "yaml" } else { "yml" }),
    ];
    for name in OVERRIDE_FILES {
        if !candidates.iter().any(|c| c == name) {
            candidates.push(name.to_string());
        }
    }

    let names: Vec<&str> = candidates.iter().map(String::as_str).collect();
    existing_file(root, &names).await
}

/// First of `names` that exists as a regular file directly under `root`
async fn existing_file(root: &Path, names: &[&str]) -> Option<PathBuf> {
    for name in names {
        let candidate = root.join(name);
        if let Ok(meta) = tokio::fs::metadata(&candidate).await {
            if meta.is_file() {
                return Some(candidate);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DeployErrorKind;

    fn working_copy(files: &[&str]) -> (tempfile::TempDir, WorkingCopy) {
        let dir = tempfile::tempdir().unwrap();
        for file in files {
            let path = dir.path().join(file);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).unwrap();
            }
            std::fs::write(path, "x").unwrap();
        }
        let wc = WorkingCopy {
            name: "app".to_string(),
            path: dir.path().to_path_buf(),
            entries: files.len(),
        };
        (dir, wc)
    }

    #[tokio::test]
    async fn test_dockerfile_only() {
        let (_dir, wc) = working_copy(&["Dockerfile"]);
        let strategy = resolve(&wc).await.unwrap();
        assert_eq!(strategy.method, DeployMethod::DockerfileBased);
        assert!(strategy.manifest.ends_with("Dockerfile"));
    }

    #[tokio::test]
    async fn test_compose_only() {
        let (_dir, wc) = working_copy(&["docker-compose.yml"]);
        let strategy = resolve(&wc).await.unwrap();
        assert_eq!(strategy.method, DeployMethod::ComposeBased);
    }

    #[tokio::test]
    async fn test_both_prefers_compose() {
        // creation order must not matter
        for files in [
            ["Dockerfile", "docker-compose.yml"],
            ["docker-compose.yml", "Dockerfile"],
        ] {
            let (_dir, wc) = working_copy(&files);
            let strategy = resolve(&wc).await.unwrap();
            assert_eq!(strategy.method, DeployMethod::ComposeBased);
            assert!(strategy.manifest.ends_with("docker-compose.yml"));
        }
    }

    #[tokio::test]
    async fn test_alternate_compose_name() {
        let (_dir, wc) = working_copy(&["compose.yaml", "Dockerfile"]);
        let strategy = resolve(&wc).await.unwrap();
        assert_eq!(strategy.method, DeployMethod::ComposeBased);
        assert!(strategy.manifest.ends_with("compose.yaml"));
    }

    #[tokio::test]
    async fn test_compose_override_is_paired() {
        let (_dir, wc) = working_copy(&["docker-compose.yml", "docker-compose.override.yml"]);
        let strategy = resolve(&wc).await.unwrap();
        assert!(strategy.manifest.ends_with("docker-compose.yml"));
        assert!(strategy
            .override_manifest
            .unwrap()
            .ends_with("docker-compose.override.yml"));

        let (_dir, wc) = working_copy(&["compose.yaml", "compose.override.yml"]);
        let strategy = resolve(&wc).await.unwrap();
        assert!(strategy.override_manifest.unwrap().ends_with("compose.override.yml"));
    }

    #[tokio::test]
    async fn test_override_prefers_manifest_family() {
        let (_dir, wc) = working_copy(&[
            "docker-compose.yml",
            "compose.override.yaml",
            "docker-compose.override.yml",
        ]);
        let strategy = resolve(&wc).await.unwrap();
        assert!(strategy
            .override_manifest
            .unwrap()
            .ends_with("docker-compose.override.yml"));

        let (_dir, wc) = working_copy(&["docker-compose.yml", "compose.override.yaml"]);
        let strategy = resolve(&wc).await.unwrap();
        assert!(strategy.override_manifest.unwrap().ends_with("compose.override.yaml"));
    }

    #[tokio::test]
    async fn test_override_alone_is_not_a_manifest() {
        let (_dir, wc) = working_copy(&["Dockerfile", "docker-compose.override.yml"]);
        let strategy = resolve(&wc).await.unwrap();
        assert_eq!(strategy.method, DeployMethod::DockerfileBased);
        assert!(strategy.override_manifest.is_none());
    }

    #[tokio::test]
    async fn test_neither_manifest() {
        let (_dir, wc) = working_copy(&["README.md"]);
        let err = resolve(&wc).await.unwrap_err();
        assert_eq!(err.kind, DeployErrorKind::NoDeploymentManifest);
    }

    #[tokio::test]
    async fn test_nested_manifests_are_ignored() {
        let (_dir, wc) = working_copy(&["app/Dockerfile", "deploy/docker-compose.yml"]);
        let err = resolve(&wc).await.unwrap_err();
        assert_eq!(err.kind, DeployErrorKind::NoDeploymentManifest);
    }

    #[tokio::test]
    async fn test_manifest_directory_does_not_count() {
        let (dir, wc) = working_copy(&["README.md"]);
        std::fs::create_dir(dir.path().join("Dockerfile")).unwrap();
        let err = resolve(&wc).await.unwrap_err();
        assert_eq!(err.kind, DeployErrorKind::NoDeploymentManifest);
    }
}
