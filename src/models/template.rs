//! Issue template catalogue entries.
//!
//! Templates come from the config file and pre-fill everything an issue
//! needs: labels, weight, target project(s), issue type. Absent fields stay
//! absent; they are never sent to the API as empty values.

use serde::{Deserialize, Serialize};

/// Target project(s) for a template.
///
/// A template may pin a single project or fan the whole pipeline out over
/// several. When present, this overrides any project id given on the
/// command line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProjectTargets {
    /// One project id or URL-encoded path.
    One(String),
    /// Ordered list of project ids; the issue pipeline runs once per entry.
    Many(Vec<String>),
}

impl ProjectTargets {
    /// Flatten to an ordered list of project ids.
    pub fn to_vec(&self) -> Vec<String> {
        match self {
            Self::One(id) => vec![id.clone()],
            Self::Many(ids) => ids.clone(),
        }
    }
}

/// A named issue template from the catalogue.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IssueTemplate {
    /// Display name shown in the template picker.
    #[serde(default)]
    pub name: String,

    /// Labels to attach to the issue (and carried onto the MR).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,

    /// Issue weight.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<i64>,

    /// Issue type (`issue`, `incident`, ...). Defaults to `issue` at send time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue_type: Option<String>,

    /// Pre-set time estimate in minutes; skips the interactive prompt.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_minutes: Option<i64>,

    /// Target project(s). Overrides the CLI-supplied project id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<ProjectTargets>,

    /// Stop after creating the issue; no branch, no merge request.
    #[serde(default)]
    pub issue_only: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_targets_one() {
        let t: ProjectTargets = serde_json::from_str("\"group/app\"").unwrap();
        assert_eq!(t.to_vec(), vec!["group/app".to_string()]);
    }

    #[test]
    fn test_project_targets_many_preserves_order() {
        let t: ProjectTargets = serde_json::from_str("[\"a\", \"b\", \"c\"]").unwrap();
        assert_eq!(
            t.to_vec(),
            vec!["a".to_string(), "b".to_string(), "c".to_string()]
        );
    }

    #[test]
    fn test_template_defaults() {
        let t: IssueTemplate = toml::from_str("name = \"Bug\"").unwrap();
        assert_eq!(t.name, "Bug");
        assert!(t.labels.is_none());
        assert!(t.weight.is_none());
        assert!(!t.issue_only);
    }

    #[test]
    fn test_template_full_toml() {
        let t: IssueTemplate = toml::from_str(
            r#"
            name = "Feature"
            labels = ["feature", "frontend"]
            weight = 3
            project = ["group/app", "group/api"]
            issue_only = true
            "#,
        )
        .unwrap();
        assert_eq!(t.labels.as_deref(), Some(&["feature".to_string(), "frontend".to_string()][..]));
        assert_eq!(t.weight, Some(3));
        assert_eq!(
            t.project.unwrap().to_vec(),
            vec!["group/app".to_string(), "group/api".to_string()]
        );
        assert!(t.issue_only);
    }
}
