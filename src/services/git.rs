//! Local version-control boundary.
//!
//! Thin wrapper over the `git` binary. Branch names, diffs and commit logs
//! cross this boundary as opaque strings; nothing here understands their
//! content.

use crate::error::AppError;
use std::process::Command;

/// Local repository operations.
pub trait Vcs {
    /// Name of the currently checked-out branch.
    fn current_branch(&self) -> Result<String, AppError>;

    /// Default branch of the `origin` remote (e.g. `main`).
    fn default_branch(&self) -> Result<String, AppError>;

    /// URL of the `origin` remote.
    fn remote_url(&self) -> Result<String, AppError>;

    /// Whether the working tree has uncommitted changes.
    fn has_uncommitted_changes(&self) -> Result<bool, AppError>;

    /// Three-dot diff of the current branch against `base`.
    fn diff_against(&self, base: &str) -> Result<String, AppError>;

    /// One-line commit log of the current branch since `base`.
    fn recent_commits(&self, base: &str) -> Result<String, AppError>;

    /// Fetch origin and check out a tracking branch.
    fn fetch_and_checkout(&self, branch: &str) -> Result<(), AppError>;
}

/// [`Vcs`] implementation shelling out to `git`.
#[derive(Debug, Default)]
pub struct GitCli;

impl GitCli {
    fn run(&self, args: &[&str]) -> Result<String, AppError> {
        let output = Command::new("git")
            .args(args)
            .output()
            .map_err(|e| AppError::git(format!("failed to run git: {}", e)))?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(AppError::git(format!(
                "git {} failed: {}",
                args.first().unwrap_or(&""),
                stderr.trim()
            )))
        }
    }
}

impl Vcs for GitCli {
    fn current_branch(&self) -> Result<String, AppError> {
        self.run(&["rev-parse", "--abbrev-ref", "HEAD"])
    }

    fn default_branch(&self) -> Result<String, AppError> {
        // origin/HEAD points at the remote default branch
        let full = self.run(&["symbolic-ref", "refs/remotes/origin/HEAD"])?;
        Ok(full
            .strip_prefix("refs/remotes/origin/")
            .unwrap_or(&full)
            .to_string())
    }

    fn remote_url(&self) -> Result<String, AppError> {
        self.run(&["remote", "get-url", "origin"])
    }

    fn has_uncommitted_changes(&self) -> Result<bool, AppError> {
        Ok(!self.run(&["status", "--porcelain"])?.is_empty())
    }

    fn diff_against(&self, base: &str) -> Result<String, AppError> {
        self.run(&["diff", &format!("{}...HEAD", base)])
    }

    fn recent_commits(&self, base: &str) -> Result<String, AppError> {
        self.run(&[
            "log",
            "--oneline",
            "--no-merges",
            &format!("{}..HEAD", base),
        ])
    }

    fn fetch_and_checkout(&self, branch: &str) -> Result<(), AppError> {
        self.run(&["fetch", "origin"])?;
        self.run(&["checkout", "-b", branch, &format!("origin/{}", branch)])?;
        Ok(())
    }
}

/// Derive the `group/project` path from a GitLab remote URL.
///
/// Handles both SSH (`git@gitlab.com:group/project.git`) and HTTPS
/// (`https://gitlab.com/group/project.git`) remotes. Returns `None` when the
/// URL does not look like either.
pub fn project_from_remote_url(url: &str) -> Option<String> {
    let url = url.trim();

    let path = if let Some(rest) = url.strip_prefix("git@") {
        // git@host:group/project(.git)
        rest.split_once(':').map(|(_, path)| path)?
    } else if let Some(rest) = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .or_else(|| url.strip_prefix("ssh://git@"))
    {
        // host/group/project(.git)
        rest.split_once('/').map(|(_, path)| path)?
    } else {
        return None;
    };

    let path = path.trim_end_matches('/').trim_end_matches(".git");
    if path.split('/').count() >= 2 {
        Some(path.to_string())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_from_ssh_remote() {
        assert_eq!(
            project_from_remote_url("git@gitlab.com:group/project.git"),
            Some("group/project".to_string())
        );
    }

    #[test]
    fn test_project_from_https_remote() {
        assert_eq!(
            project_from_remote_url("https://gitlab.com/group/project.git"),
            Some("group/project".to_string())
        );
    }

    #[test]
    fn test_project_from_nested_group() {
        assert_eq!(
            project_from_remote_url("git@gitlab.com:group/sub/project.git"),
            Some("group/sub/project".to_string())
        );
    }

    #[test]
    fn test_project_from_garbage_is_none() {
        assert_eq!(project_from_remote_url("not a url"), None);
        assert_eq!(project_from_remote_url("https://gitlab.com/"), None);
    }
}
