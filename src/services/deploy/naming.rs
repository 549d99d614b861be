//! Generated names and identifiers
//!
//! Deployment and image names combine a millisecond timestamp (readable)
//! with a process-wide sequence number (unique within the same tick).

use chrono::Utc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Source of unique deployment, image and fallback repository names
#[derive(Debug)]
pub struct NameGenerator {
    prefix: String,
    sequence: AtomicU64,
}

impl NameGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            sequence: AtomicU64::new(0),
        }
    }

    fn token(&self) -> String {
        let seq = self.sequence.fetch_add(1, Ordering::Relaxed);
        format!("{}-{}", Utc::now().timestamp_millis(), seq)
    }

    /// Container name / compose project name
    pub fn deployment_name(&self) -> String {
        format!("{}-deploy-{}", self.prefix, self.token())
    }

    pub fn image_name(&self) -> String {
        format!("{}-image-{}", self.prefix, self.token())
    }

    /// Used when no usable name can be derived from the link
    pub fn fallback_repo_name(&self) -> String {
        format!("repo-{}", self.token())
    }
}

/// Correlation id for one request (`req-<unix-ms>-<8 hex>`)
pub fn request_id() -> String {
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!("req-{}-{}", Utc::now().timestamp_millis(), &suffix[..8])
}

/// Working-copy name from a repository link: last path segment without `.git`
///
/// Returns None when nothing usable remains (empty, `.` or `..`).
pub fn derive_repo_name(link: &str) -> Option<String> {
    let trimmed = link.trim().trim_end_matches('/');
    let last = trimmed.rsplit(['/', ':', '\\']).next().unwrap_or_default();
    let base = last.strip_suffix(".git").unwrap_or(last);

    let name: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '-'
            }
        })
        .collect();

    if name.is_empty() || name.chars().all(|c| c == '.') {
        None
    } else {
        Some(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_back_to_back_names_are_distinct() {
        let names = NameGenerator::new("zeph");
        // far more than fit in one millisecond
        let generated: Vec<String> = (0..1000).map(|_| names.deployment_name()).collect();
        let unique: HashSet<&String> = generated.iter().collect();

        assert_eq!(unique.len(), generated.len());
        assert!(generated[0].starts_with("zeph-deploy-"));
    }

    #[test]
    fn test_image_and_deployment_names_differ() {
        let names = NameGenerator::new("zeph");
        let deployment = names.deployment_name();
        let image = names.image_name();

        assert!(image.starts_with("zeph-image-"));
        assert_ne!(
            deployment.trim_start_matches("zeph-deploy-"),
            image.trim_start_matches("zeph-image-")
        );
    }

    #[test]
    fn test_request_id_format() {
        let id = request_id();
        let parts: Vec<&str> = id.split('-').collect();
        assert_eq!(parts[0], "req");
        assert!(parts[1].parse::<i64>().is_ok());
        assert_eq!(parts[2].len(), 8);
        assert_ne!(request_id(), id);
    }

    #[test]
    fn test_derive_repo_name() {
        assert_eq!(
            derive_repo_name("https://example.test/repo-with-dockerfile.git").as_deref(),
            Some("repo-with-dockerfile")
        );
        assert_eq!(
            derive_repo_name("https://github.com/owner/app/").as_deref(),
            Some("app")
        );
        assert_eq!(
            derive_repo_name("git@github.com:owner/service.git").as_deref(),
            Some("service")
        );
        assert_eq!(
            derive_repo_name("https://host/my repo.git").as_deref(),
            Some("my-repo")
        );
    }

    #[test]
    fn test_derive_repo_name_rejects_unusable() {
        assert_eq!(derive_repo_name(""), None);
        assert_eq!(derive_repo_name("https://host/.git"), None);
        assert_eq!(derive_repo_name("https://host/.."), None);
        assert_eq!(derive_repo_name("/"), None);
    }
}
