//! Shared test doubles: a scriptable tracker, a canned local repository and
//! a queue-driven prompter.

#![allow(dead_code)]

use async_trait::async_trait;
use git_happens::error::AppError;
use git_happens::models::{
    Branch, DiffRefs, Epic, GitLabProject, GitLabUser, Issue, Iteration, Job, Label, Member,
    MergeRequest, MergeRequestUpdate, Milestone, NewIssue, NewMergeRequest, Pipeline,
};
use git_happens::services::{Completion, Prompter, ResponseFormat, Tracker, Vcs};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

pub fn complete_refs() -> DiffRefs {
    DiffRefs {
        base_sha: Some("aaa111".into()),
        head_sha: Some("bbb222".into()),
        start_sha: Some("ccc333".into()),
    }
}

pub fn pipeline(id: i64, sha: &str) -> Pipeline {
    Pipeline {
        id,
        status: "success".into(),
        ref_name: "main".into(),
        sha: sha.into(),
        web_url: format!("https://gitlab.example.com/pipelines/{}", id),
        updated_at: None,
    }
}

pub fn job(id: i64, name: &str, stage: &str, status: &str) -> Job {
    Job {
        id,
        name: name.into(),
        stage: stage.into(),
        status: status.into(),
        started_at: None,
        finished_at: None,
        duration: None,
        web_url: format!("https://gitlab.example.com/jobs/{}", id),
    }
}

/// In-memory [`Tracker`] with canned data and call recording.
#[derive(Default)]
pub struct StubTracker {
    pub default_branch: Option<String>,
    pub milestones: Vec<Milestone>,
    pub iterations: Vec<Iteration>,
    pub epics: Vec<Epic>,
    pub labels: Vec<Label>,
    pub members: Vec<Member>,
    pub diff_refs: DiffRefs,
    pub open_mr: Option<MergeRequest>,
    pub pipelines: Vec<Pipeline>,
    pub jobs: HashMap<i64, Vec<Job>>,

    /// Projects whose `create_issue` calls fail.
    pub fail_issue_for: Vec<String>,
    /// File paths whose inline comments fail.
    pub fail_inline_paths: Vec<String>,

    pub issue_attempts: Mutex<Vec<String>>,
    pub issues_created: Mutex<Vec<(String, NewIssue)>>,
    pub branches_created: Mutex<Vec<(String, String)>>,
    pub mrs_created: Mutex<Vec<(String, NewMergeRequest)>>,
    pub notes: Mutex<Vec<String>>,
    pub inline_posts: Mutex<Vec<(String, i64)>>,
    pub spent_time: Mutex<Vec<(String, i64, String)>>,
    pub updates: Mutex<Vec<(i64, MergeRequestUpdate)>>,
    pub auto_merges: Mutex<Vec<i64>>,
    pub pipeline_refs: Mutex<Vec<String>>,
    pub next_iid: Mutex<i64>,
}

pub fn stub_mr(project_id: i64, iid: i64, title: &str, source_branch: &str) -> MergeRequest {
    MergeRequest {
        id: iid,
        iid,
        project_id,
        title: title.into(),
        description: None,
        source_branch: source_branch.into(),
        target_branch: "main".into(),
        state: "opened".into(),
        web_url: format!("https://gitlab.example.com/mr/{}", iid),
        diff_refs: None,
    }
}

#[async_trait]
impl Tracker for StubTracker {
    async fn get_user(&self) -> Result<GitLabUser, AppError> {
        Ok(GitLabUser {
            id: 7,
            username: "dev".into(),
            name: "Dev Eloper".into(),
        })
    }

    async fn get_project(&self, project: &str) -> Result<GitLabProject, AppError> {
        Ok(GitLabProject {
            id: 1,
            path_with_namespace: project.to_string(),
            default_branch: self.default_branch.clone(),
            web_url: format!("https://gitlab.example.com/{}", project),
        })
    }

    async fn create_issue(&self, project: &str, issue: &NewIssue) -> Result<Issue, AppError> {
        self.issue_attempts.lock().unwrap().push(project.to_string());
        if self.fail_issue_for.iter().any(|p| p == project) {
            return Err(AppError::internal(format!("stubbed failure for {}", project)));
        }
        let iid = {
            let mut next = self.next_iid.lock().unwrap();
            *next += 1;
            *next
        };
        self.issues_created
            .lock()
            .unwrap()
            .push((project.to_string(), issue.clone()));
        Ok(Issue {
            id: iid,
            iid,
            title: issue.title.clone(),
            description: issue.description.clone(),
            web_url: format!("https://gitlab.example.com/{}/-/issues/{}", project, iid),
        })
    }

    async fn create_branch(
        &self,
        project: &str,
        branch: &str,
        _base_ref: &str,
        _issue_iid: i64,
    ) -> Result<Branch, AppError> {
        self.branches_created
            .lock()
            .unwrap()
            .push((project.to_string(), branch.to_string()));
        Ok(Branch {
            name: branch.to_string(),
        })
    }

    async fn create_merge_request(
        &self,
        project: &str,
        mr: &NewMergeRequest,
    ) -> Result<MergeRequest, AppError> {
        let mut created = self.mrs_created.lock().unwrap();
        created.push((project.to_string(), mr.clone()));
        Ok(stub_mr(1, 100 + created.len() as i64, &mr.title, &mr.source_branch))
    }

    async fn update_merge_request(
        &self,
        _project: &str,
        mr_iid: i64,
        update: &MergeRequestUpdate,
    ) -> Result<MergeRequest, AppError> {
        self.updates.lock().unwrap().push((mr_iid, update.clone()));
        let title = update.title.clone().unwrap_or_else(|| "unchanged".into());
        Ok(stub_mr(1, mr_iid, &title, "branch"))
    }

    async fn list_milestones(&self, _group: &str) -> Result<Vec<Milestone>, AppError> {
        Ok(self.milestones.clone())
    }

    async fn list_iterations(&self, _group: &str) -> Result<Vec<Iteration>, AppError> {
        Ok(self.iterations.clone())
    }

    async fn list_epics(&self, _group: &str) -> Result<Vec<Epic>, AppError> {
        Ok(self.epics.clone())
    }

    async fn list_labels(&self, _project: &str) -> Result<Vec<Label>, AppError> {
        Ok(self.labels.clone())
    }

    async fn list_members(&self, _project: &str) -> Result<Vec<Member>, AppError> {
        Ok(self.members.clone())
    }

    async fn find_merge_request(
        &self,
        _project: &str,
        source_branch: &str,
    ) -> Result<Option<MergeRequest>, AppError> {
        Ok(self
            .open_mr
            .clone()
            .filter(|mr| mr.source_branch == source_branch))
    }

    async fn get_diff_refs(&self, _project: &str, _mr_iid: i64) -> Result<DiffRefs, AppError> {
        Ok(self.diff_refs.clone())
    }

    async fn post_note(&self, _project: &str, _mr_iid: i64, body: &str) -> Result<(), AppError> {
        self.notes.lock().unwrap().push(body.to_string());
        Ok(())
    }

    async fn post_inline_comment(
        &self,
        _project: &str,
        _mr_iid: i64,
        _body: &str,
        new_path: &str,
        new_line: i64,
        _refs: &DiffRefs,
    ) -> Result<(), AppError> {
        if self.fail_inline_paths.iter().any(|p| p == new_path) {
            return Err(AppError::internal(format!("stubbed failure for {}", new_path)));
        }
        self.inline_posts
            .lock()
            .unwrap()
            .push((new_path.to_string(), new_line));
        Ok(())
    }

    async fn merge_when_pipeline_succeeds(
        &self,
        _project: &str,
        mr_iid: i64,
    ) -> Result<(), AppError> {
        self.auto_merges.lock().unwrap().push(mr_iid);
        Ok(())
    }

    async fn add_spent_time(
        &self,
        project: &str,
        issue_iid: i64,
        duration: &str,
    ) -> Result<(), AppError> {
        self.spent_time
            .lock()
            .unwrap()
            .push((project.to_string(), issue_iid, duration.to_string()));
        Ok(())
    }

    async fn get_pipelines(
        &self,
        _project: &str,
        ref_name: &str,
        limit: u32,
    ) -> Result<Vec<Pipeline>, AppError> {
        self.pipeline_refs.lock().unwrap().push(ref_name.to_string());
        Ok(self
            .pipelines
            .iter()
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn get_pipeline_jobs(
        &self,
        _project: &str,
        pipeline_id: i64,
    ) -> Result<Vec<Job>, AppError> {
        Ok(self.jobs.get(&pipeline_id).cloned().unwrap_or_default())
    }
}

/// Canned local repository.
pub struct StubVcs {
    pub remote: String,
    pub branch: String,
}

impl Default for StubVcs {
    fn default() -> Self {
        Self {
            remote: "git@gitlab.example.com:group/solo.git".into(),
            branch: "42-fix-it".into(),
        }
    }
}

impl Vcs for StubVcs {
    fn current_branch(&self) -> Result<String, AppError> {
        Ok(self.branch.clone())
    }

    fn default_branch(&self) -> Result<String, AppError> {
        Ok("main".into())
    }

    fn remote_url(&self) -> Result<String, AppError> {
        Ok(self.remote.clone())
    }

    fn has_uncommitted_changes(&self) -> Result<bool, AppError> {
        Ok(false)
    }

    fn diff_against(&self, _base: &str) -> Result<String, AppError> {
        Ok("diff --git a/x b/x".into())
    }

    fn recent_commits(&self, _base: &str) -> Result<String, AppError> {
        Ok("abc1234 fix it".into())
    }

    fn fetch_and_checkout(&self, _branch: &str) -> Result<(), AppError> {
        Ok(())
    }
}

/// Completion returning one canned answer.
pub struct CannedCompletion(pub String);

#[async_trait]
impl Completion for CannedCompletion {
    async fn complete(
        &self,
        _system_prompt: &str,
        _user_content: &str,
        _format: ResponseFormat,
    ) -> Result<String, AppError> {
        Ok(self.0.clone())
    }
}

/// Prompter answering from pre-loaded queues; exhausted queues abort.
#[derive(Default)]
pub struct ScriptedPrompter {
    pub selects: Mutex<VecDeque<Option<String>>>,
    pub inputs: Mutex<VecDeque<Option<String>>>,
}

impl ScriptedPrompter {
    pub fn with_selects(answers: Vec<Option<&str>>) -> Self {
        Self {
            selects: Mutex::new(answers.into_iter().map(|a| a.map(String::from)).collect()),
            inputs: Mutex::default(),
        }
    }

    pub fn push_input(&self, answer: Option<&str>) {
        self.inputs
            .lock()
            .unwrap()
            .push_back(answer.map(String::from));
    }
}

impl Prompter for ScriptedPrompter {
    fn select(&self, _message: &str, _options: &[String]) -> Result<Option<String>, AppError> {
        Ok(self.selects.lock().unwrap().pop_front().flatten())
    }

    fn fuzzy_select(&self, message: &str, options: &[String]) -> Result<Option<String>, AppError> {
        self.select(message, options)
    }

    fn input(&self, _message: &str) -> Result<Option<String>, AppError> {
        Ok(self.inputs.lock().unwrap().pop_front().flatten())
    }

    fn confirm(&self, _message: &str, default: bool) -> Result<bool, AppError> {
        Ok(default)
    }
}
