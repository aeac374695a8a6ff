//! Remote tracker boundary.
//!
//! One trait method per logical operation. Orchestration code only sees
//! this trait; whether an implementation speaks HTTP or shells out to a CLI
//! is its own business. The production implementation is
//! [`crate::services::gitlab_client::GitLabClient`].

use crate::error::AppError;
use crate::models::{
    Branch, DiffRefs, Epic, GitLabProject, GitLabUser, Issue, Iteration, Job, Label, Member,
    MergeRequest, MergeRequestUpdate, Milestone, NewIssue, NewMergeRequest, Pipeline,
};
use async_trait::async_trait;

/// Remote tracker operations, one method per API call.
#[async_trait]
pub trait Tracker {
    /// The authenticated user.
    async fn get_user(&self) -> Result<GitLabUser, AppError>;

    /// A single project by id or URL-encoded path.
    async fn get_project(&self, project: &str) -> Result<GitLabProject, AppError>;

    /// Create an issue. Absent fields in the body are never sent.
    async fn create_issue(&self, project: &str, issue: &NewIssue) -> Result<Issue, AppError>;

    /// Create a branch off `base_ref`, linked to an issue.
    async fn create_branch(
        &self,
        project: &str,
        branch: &str,
        base_ref: &str,
        issue_iid: i64,
    ) -> Result<Branch, AppError>;

    /// Create a merge request.
    async fn create_merge_request(
        &self,
        project: &str,
        mr: &NewMergeRequest,
    ) -> Result<MergeRequest, AppError>;

    /// Update fields on an existing merge request.
    async fn update_merge_request(
        &self,
        project: &str,
        mr_iid: i64,
        update: &MergeRequestUpdate,
    ) -> Result<MergeRequest, AppError>;

    /// Active milestones in the group scope.
    async fn list_milestones(&self, group: &str) -> Result<Vec<Milestone>, AppError>;

    /// Open iterations in the group scope.
    async fn list_iterations(&self, group: &str) -> Result<Vec<Iteration>, AppError>;

    /// Open epics in the group scope.
    async fn list_epics(&self, group: &str) -> Result<Vec<Epic>, AppError>;

    /// Labels defined on a project.
    async fn list_labels(&self, project: &str) -> Result<Vec<Label>, AppError>;

    /// Members of a project (reviewer candidates).
    async fn list_members(&self, project: &str) -> Result<Vec<Member>, AppError>;

    /// The open merge request whose source branch matches, if any.
    async fn find_merge_request(
        &self,
        project: &str,
        source_branch: &str,
    ) -> Result<Option<MergeRequest>, AppError>;

    /// The diff refs anchoring a merge request's changes.
    async fn get_diff_refs(&self, project: &str, mr_iid: i64) -> Result<DiffRefs, AppError>;

    /// Post a plain comment on a merge request.
    async fn post_note(&self, project: &str, mr_iid: i64, body: &str) -> Result<(), AppError>;

    /// Post an inline discussion anchored to a new-file line.
    async fn post_inline_comment(
        &self,
        project: &str,
        mr_iid: i64,
        body: &str,
        new_path: &str,
        new_line: i64,
        refs: &DiffRefs,
    ) -> Result<(), AppError>;

    /// Set a merge request to merge automatically when its pipeline passes.
    async fn merge_when_pipeline_succeeds(
        &self,
        project: &str,
        mr_iid: i64,
    ) -> Result<(), AppError>;

    /// Record spent time on an issue (duration like `"45m"`).
    async fn add_spent_time(
        &self,
        project: &str,
        issue_iid: i64,
        duration: &str,
    ) -> Result<(), AppError>;

    /// Most recently updated pipelines for a ref, bounded by `limit`,
    /// in the order the tracker returns them.
    async fn get_pipelines(
        &self,
        project: &str,
        ref_name: &str,
        limit: u32,
    ) -> Result<Vec<Pipeline>, AppError>;

    /// Jobs of one pipeline.
    async fn get_pipeline_jobs(
        &self,
        project: &str,
        pipeline_id: i64,
    ) -> Result<Vec<Job>, AppError>;
}
