//! GitLab API records.
//!
//! Thin deserialization types mirroring the API v4 payloads we touch, plus
//! the outbound request bodies. Outbound types use `skip_serializing_if` on
//! every optional field: a field the pipeline did not resolve is never sent,
//! not even as null or an empty string.

use serde::{Deserialize, Serialize};

/// GitLab user from API.
#[derive(Debug, Clone, Deserialize)]
pub struct GitLabUser {
    pub id: i64,
    pub username: String,
    pub name: String,
}

/// GitLab project from API.
#[derive(Debug, Clone, Deserialize)]
pub struct GitLabProject {
    pub id: i64,
    pub path_with_namespace: String,
    pub default_branch: Option<String>,
    pub web_url: String,
}

/// GitLab issue from API.
#[derive(Debug, Clone, Deserialize)]
pub struct Issue {
    pub id: i64,
    pub iid: i64,
    pub title: String,
    pub description: Option<String>,
    pub web_url: String,
}

/// GitLab repository branch from API.
#[derive(Debug, Clone, Deserialize)]
pub struct Branch {
    pub name: String,
}

/// The three commit SHAs anchoring a merge request's diff.
///
/// Inline comments can only be attempted when all three are present.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiffRefs {
    pub base_sha: Option<String>,
    pub head_sha: Option<String>,
    pub start_sha: Option<String>,
}

impl DiffRefs {
    /// True when every component is present.
    pub fn is_complete(&self) -> bool {
        self.base_sha.is_some() && self.head_sha.is_some() && self.start_sha.is_some()
    }
}

/// GitLab merge request from API.
#[derive(Debug, Clone, Deserialize)]
pub struct MergeRequest {
    pub id: i64,
    pub iid: i64,
    pub project_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub source_branch: String,
    pub target_branch: String,
    pub state: String,
    pub web_url: String,
    pub diff_refs: Option<DiffRefs>,
}

/// GitLab epic from API (group scope).
#[derive(Debug, Clone, Deserialize)]
pub struct Epic {
    pub id: i64,
    pub iid: i64,
    pub title: String,
}

/// GitLab label from API.
#[derive(Debug, Clone, Deserialize)]
pub struct Label {
    pub id: i64,
    pub name: String,
}

/// GitLab project member from API.
#[derive(Debug, Clone, Deserialize)]
pub struct Member {
    pub id: i64,
    pub username: String,
    pub name: String,
}

/// GitLab pipeline from API (GET /projects/:id/pipelines).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pipeline {
    pub id: i64,
    pub status: String,
    #[serde(rename = "ref")]
    pub ref_name: String,
    pub sha: String,
    pub web_url: String,
    pub updated_at: Option<String>,
}

/// GitLab pipeline job from API (GET /projects/:id/pipelines/:pipeline_id/jobs).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: i64,
    pub name: String,
    pub stage: String,
    pub status: String,
    pub started_at: Option<String>,
    pub finished_at: Option<String>,
    pub duration: Option<f64>,
    pub web_url: String,
}

/// Outbound body for POST /projects/:id/issues.
#[derive(Debug, Clone, Default, Serialize)]
pub struct NewIssue {
    pub title: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Comma-joined label list, GitLab's wire format.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub milestone_id: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub epic_id: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue_type: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee_ids: Option<Vec<i64>>,
}

/// Outbound body for POST /projects/:id/merge_requests.
#[derive(Debug, Clone, Default, Serialize)]
pub struct NewMergeRequest {
    pub title: String,
    pub source_branch: String,
    pub target_branch: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub milestone_id: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee_id: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub remove_source_branch: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub squash: Option<bool>,
}

/// Outbound body for PUT /projects/:id/merge_requests/:iid.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MergeRequestUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewer_ids: Option<Vec<i64>>,
}
