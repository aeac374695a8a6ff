//! Application configuration.
//!
//! One TOML file, read once at startup into [`AppConfig`] and passed by
//! reference into every component. Pipeline code never reaches into
//! globals or the environment; the only environment fallbacks (token, API
//! key) are resolved here and in the credentials service.
//!
//! ```toml
//! base_url = "https://gitlab.com"
//! group = "my-group"
//! custom_template = "Custom"
//! squash = true
//! remove_source_branch = true
//! deploy_ref = "main"            # optional; default branch otherwise
//!
//! [ai]
//! model = "gpt-4o"
//!
//! [[templates]]
//! name = "Bug"
//! labels = ["bug"]
//! weight = 1
//! project = ["group/app", "group/api"]
//!
//! [deployments."group/app"]
//! stage = "deploy"
//! job = "deploy-production"      # optional; stage match alone otherwise
//! ```

use crate::error::AppError;
use crate::models::IssueTemplate;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Fallback ref for deployment scanning when neither the config nor the
/// project supplies one.
pub const DEFAULT_DEPLOY_REF: &str = "master";

/// How many recent pipelines the deployment detector scans.
pub const DEPLOY_SCAN_LIMIT: u32 = 20;

/// Production deployment matcher for one project.
#[derive(Debug, Clone, Deserialize)]
pub struct DeployTarget {
    /// Pipeline stage name, compared case-insensitively.
    pub stage: String,

    /// Expected job name, compared case-insensitively when set.
    #[serde(default)]
    pub job: Option<String>,
}

/// Language-model settings.
#[derive(Debug, Clone, Deserialize)]
pub struct AiConfig {
    /// Chat model identifier.
    #[serde(default = "default_model")]
    pub model: String,

    /// API key; `OPENAI_API_KEY` is the usual source.
    #[serde(default)]
    pub api_key: Option<String>,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            api_key: None,
        }
    }
}

fn default_model() -> String {
    "gpt-4o".to_string()
}

fn default_custom_template() -> String {
    "Custom".to_string()
}

fn default_true() -> bool {
    true
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Base URL of the GitLab instance.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Group id or URL-encoded path for milestone/iteration/epic scope.
    pub group: String,

    /// Name of the "custom" sentinel entry in the template picker.
    #[serde(default = "default_custom_template")]
    pub custom_template: String,

    /// Squash commits on merge for created merge requests.
    #[serde(default = "default_true")]
    pub squash: bool,

    /// Delete the source branch when a created merge request merges.
    #[serde(default = "default_true")]
    pub remove_source_branch: bool,

    /// Explicit ref for deployment scanning; falls back to the project's
    /// default branch, then [`DEFAULT_DEPLOY_REF`].
    #[serde(default)]
    pub deploy_ref: Option<String>,

    /// Issue template catalogue.
    #[serde(default)]
    pub templates: Vec<IssueTemplate>,

    /// Per-project production deployment matchers, keyed by project path.
    #[serde(default)]
    pub deployments: HashMap<String, DeployTarget>,

    /// Language-model settings.
    #[serde(default)]
    pub ai: AiConfig,
}

fn default_base_url() -> String {
    "https://gitlab.com".to_string()
}

impl AppConfig {
    /// Load configuration from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self, AppError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            AppError::config(format!("cannot read {}: {}", path.display(), e))
        })?;
        toml::from_str(&raw)
            .map_err(|e| AppError::config(format!("invalid config {}: {}", path.display(), e)))
    }

    /// Load configuration from the default location
    /// (`~/.config/git-happens/config.toml`).
    pub fn load_default() -> Result<Self, AppError> {
        let path = Self::default_path()
            .ok_or_else(|| AppError::config("cannot determine config directory"))?;
        Self::load_from(&path)
    }

    /// Default config file path, if a config directory exists.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("git-happens").join("config.toml"))
    }

    /// Deployment matcher for a project, if one is configured.
    pub fn deploy_target(&self, project: &str) -> Option<&DeployTarget> {
        self.deployments.get(project)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"
        base_url = "https://gitlab.example.com"
        group = "platform"
        deploy_ref = "main"

        [ai]
        model = "gpt-4o"

        [[templates]]
        name = "Bug"
        labels = ["bug"]
        weight = 1

        [[templates]]
        name = "Chore"
        issue_only = true

        [deployments."platform/app"]
        stage = "deploy"
        job = "deploy-production"
    "#;

    #[test]
    fn test_parse_sample_config() {
        let config: AppConfig = toml::from_str(SAMPLE).unwrap();
        assert_eq!(config.base_url, "https://gitlab.example.com");
        assert_eq!(config.group, "platform");
        assert_eq!(config.custom_template, "Custom");
        assert!(config.squash);
        assert_eq!(config.templates.len(), 2);
        assert!(config.templates[1].issue_only);
        let target = config.deploy_target("platform/app").unwrap();
        assert_eq!(target.stage, "deploy");
        assert_eq!(target.job.as_deref(), Some("deploy-production"));
        assert!(config.deploy_target("platform/other").is_none());
    }

    #[test]
    fn test_group_is_required() {
        let result: Result<AppConfig, _> = toml::from_str("base_url = \"x\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_load_from_missing_file_is_config_error() {
        let err = AppConfig::load_from(Path::new("/nonexistent/config.toml")).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        let config = AppConfig::load_from(file.path()).unwrap();
        assert_eq!(config.templates[0].name, "Bug");
    }
}
