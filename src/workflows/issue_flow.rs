//! Issue pipeline: title in, linked issue + branch + merge request out.
//!
//! A linear state machine with optional skips. Enrichment (milestone,
//! iteration, epic, estimate) is resolved once up front; the creation steps
//! then run once per target project when the template fans out. Targets are
//! independent: one target failing does not roll back or block the others.

use crate::config::AppConfig;
use crate::error::AppError;
use crate::models::{Epic, IssueTemplate, Iteration, MergeRequest, Milestone, NewIssue, NewMergeRequest};
use crate::services::git::project_from_remote_url;
use crate::services::prompt::filter_by_query;
use crate::services::{Prompter, Tracker, Vcs};
use crate::workflows::{templates, timebox};
use console::style;

/// Flags controlling one pipeline run.
#[derive(Debug, Clone, Default)]
pub struct IssueFlowOptions {
    /// Issue title, free text.
    pub title: String,

    /// Project id or path from the command line. A template-provided target
    /// overrides this with a printed notice.
    pub project: Option<String>,

    /// Pick the milestone by hand instead of the active one.
    pub manual_milestone: bool,

    /// Pick the iteration by hand instead of the active one.
    pub manual_iteration: bool,

    /// Skip milestone resolution entirely.
    pub skip_milestone: bool,

    /// Skip iteration resolution entirely.
    pub skip_iteration: bool,

    /// Skip epic selection entirely.
    pub skip_epic: bool,

    /// Stop after the issue; no branch, no merge request.
    pub issue_only: bool,

    /// Fetch and check out the new branch instead of printing the commands.
    pub checkout: bool,
}

/// Everything resolved before the creation steps run.
#[derive(Debug, Default)]
struct Enrichment {
    milestone: Option<Milestone>,
    iteration: Option<Iteration>,
    epic: Option<Epic>,
    estimate_per_target: Option<i64>,
}

/// Issue pipeline orchestrator.
pub struct IssuePipeline<'a> {
    config: &'a AppConfig,
    tracker: &'a dyn Tracker,
    vcs: &'a dyn Vcs,
    prompter: &'a dyn Prompter,
}

impl<'a> IssuePipeline<'a> {
    pub fn new(
        config: &'a AppConfig,
        tracker: &'a dyn Tracker,
        vcs: &'a dyn Vcs,
        prompter: &'a dyn Prompter,
    ) -> Self {
        Self {
            config,
            tracker,
            vcs,
            prompter,
        }
    }

    /// Run the full pipeline: resolve settings and enrichment, then create
    /// issue / branch / merge request per target.
    pub async fn run(&self, opts: &IssueFlowOptions) -> Result<(), AppError> {
        let template = templates::pick(self.config, self.prompter)?;
        let targets = self.resolve_targets(&template, opts)?;
        let template = self.offer_labels(template, &targets[0]).await?;
        let enrichment = self.resolve_enrichment(&template, opts, targets.len()).await?;

        let mut last_error = None;
        let mut succeeded = 0usize;
        for target in &targets {
            match self.run_target(target, &template, &enrichment, opts).await {
                Ok(()) => succeeded += 1,
                Err(e) => {
                    eprintln!("{} {}: {}", style("✗").red(), target, e);
                    last_error = Some(e);
                }
            }
        }

        match (succeeded, last_error) {
            // All targets failed; surface the last error.
            (0, Some(e)) => Err(e),
            _ => Ok(()),
        }
    }

    /// Resolve the target project list.
    ///
    /// Template targets are authoritative; a CLI-supplied project id is
    /// ignored with a visible notice. Without either, the project is derived
    /// from the local repository's origin remote.
    fn resolve_targets(
        &self,
        template: &IssueTemplate,
        opts: &IssueFlowOptions,
    ) -> Result<Vec<String>, AppError> {
        if let Some(targets) = &template.project {
            if opts.project.is_some() {
                println!(
                    "Note: template {:?} pins its own project target(s); ignoring --project.",
                    template.name
                );
            }
            let targets = targets.to_vec();
            if targets.is_empty() {
                return Err(AppError::config(format!(
                    "template {:?} has an empty project list",
                    template.name
                )));
            }
            return Ok(targets);
        }

        if let Some(project) = &opts.project {
            return Ok(vec![project.clone()]);
        }

        let remote = self.vcs.remote_url()?;
        project_from_remote_url(&remote)
            .map(|p| vec![p])
            .ok_or_else(|| {
                AppError::invalid_input(format!(
                    "cannot derive a project from remote {:?}; pass --project",
                    remote
                ))
            })
    }

    /// Resolve milestone, iteration, epic and the time estimate.
    async fn resolve_enrichment(
        &self,
        template: &IssueTemplate,
        opts: &IssueFlowOptions,
        target_count: usize,
    ) -> Result<Enrichment, AppError> {
        let today = chrono::Local::now().date_naive();

        let milestone = if opts.skip_milestone {
            None
        } else {
            let milestones = self.tracker.list_milestones(&self.config.group).await?;
            if opts.manual_milestone {
                timebox::select_manual(&milestones, self.prompter, "Select milestone")?
            } else {
                Some(timebox::select_active(&milestones, today, "milestone")?)
            }
        };

        let iteration = if opts.skip_iteration {
            None
        } else {
            let iterations = self.tracker.list_iterations(&self.config.group).await?;
            if opts.manual_iteration {
                timebox::select_manual(&iterations, self.prompter, "Select iteration")?
            } else {
                Some(timebox::select_active(&iterations, today, "iteration")?)
            }
        };

        let epic = if opts.skip_epic {
            None
        } else {
            self.select_epic().await?
        };

        let estimate = match template.estimated_minutes {
            Some(minutes) => Some(minutes),
            None => self.prompt_estimate()?,
        };
        let estimate_per_target =
            estimate.map(|total| split_estimate(total, target_count));

        Ok(Enrichment {
            milestone,
            iteration,
            epic,
            estimate_per_target,
        })
    }

    /// A custom run (empty settings record) carries no preset labels; offer
    /// the target project's labels instead. Named templates keep whatever
    /// the catalogue says, including no labels at all.
    async fn offer_labels(
        &self,
        mut template: IssueTemplate,
        project: &str,
    ) -> Result<IssueTemplate, AppError> {
        if !template.name.is_empty() || template.labels.is_some() {
            return Ok(template);
        }
        let labels = self.tracker.list_labels(project).await?;
        if labels.is_empty() {
            return Ok(template);
        }
        let names: Vec<String> = labels.iter().map(|l| l.name.clone()).collect();
        if let Some(chosen) = self.prompter.fuzzy_select("Label (esc for none)", &names)? {
            template.labels = Some(vec![chosen]);
        }
        Ok(template)
    }

    /// Epic selection: free-text query, case-insensitive substring filter,
    /// then a single-choice list resolved by exact title.
    async fn select_epic(&self) -> Result<Option<Epic>, AppError> {
        let epics = self.tracker.list_epics(&self.config.group).await?;
        if epics.is_empty() {
            return Ok(None);
        }

        let titles: Vec<String> = epics.iter().map(|e| e.title.clone()).collect();
        let filtered = match self.prompter.input("Search epic")? {
            Some(query) => filter_by_query(&titles, &query),
            None => titles,
        };
        if filtered.is_empty() {
            return Ok(None);
        }

        let chosen = match self.prompter.select("Select epic", &filtered)? {
            Some(title) => title,
            None => return Ok(None),
        };
        Ok(epics.iter().find(|e| e.title == chosen).cloned())
    }

    /// Prompt for an estimate in minutes; digits only, empty to skip.
    fn prompt_estimate(&self) -> Result<Option<i64>, AppError> {
        match self.prompter.input("Estimated time in minutes (empty to skip)")? {
            None => Ok(None),
            Some(text) => text.parse::<i64>().ok().filter(|m| *m > 0).map(Some).ok_or_else(
                || AppError::invalid_input(format!("estimate must be a number of minutes, got {:?}", text)),
            ),
        }
    }

    /// Creation steps for one target project.
    async fn run_target(
        &self,
        project: &str,
        template: &IssueTemplate,
        enrichment: &Enrichment,
        opts: &IssueFlowOptions,
    ) -> Result<(), AppError> {
        let user = self.tracker.get_user().await?;
        let default_branch = self
            .tracker
            .get_project(project)
            .await?
            .default_branch
            .unwrap_or_else(|| "master".to_string());

        let new_issue = NewIssue {
            title: opts.title.clone(),
            description: build_description(
                enrichment.iteration.as_ref().map(|i| i.id),
                enrichment.estimate_per_target,
            ),
            labels: template.labels.as_ref().map(|l| l.join(",")),
            milestone_id: enrichment.milestone.as_ref().map(|m| m.id),
            epic_id: enrichment.epic.as_ref().map(|e| e.id),
            weight: template.weight,
            issue_type: Some(
                template
                    .issue_type
                    .clone()
                    .unwrap_or_else(|| "issue".to_string()),
            ),
            assignee_ids: Some(vec![user.id]),
        };

        let issue = self.tracker.create_issue(project, &new_issue).await?;
        println!(
            "{} Issue #{}: {} created.",
            style("✓").green(),
            issue.iid,
            issue.title
        );

        if template.issue_only || opts.issue_only {
            println!("  {}", issue.web_url);
            return Ok(());
        }

        let branch_name = branch_name_for(issue.iid, &issue.title);
        let branch = self
            .tracker
            .create_branch(project, &branch_name, &default_branch, issue.iid)
            .await?;

        let new_mr = NewMergeRequest {
            title: format!("Draft: Resolve \"{}\"", issue.title),
            source_branch: branch.name.clone(),
            target_branch: default_branch,
            description: Some(closing_reference(issue.iid)),
            labels: template.labels.as_ref().map(|l| l.join(",")),
            milestone_id: enrichment.milestone.as_ref().map(|m| m.id),
            assignee_id: Some(user.id),
            remove_source_branch: self.config.remove_source_branch.then_some(true),
            squash: self.config.squash.then_some(true),
        };
        let mr = self.tracker.create_merge_request(project, &new_mr).await?;
        println!(
            "{} Merge request !{}: {} created.",
            style("✓").green(),
            mr.iid,
            mr.title
        );

        self.report_checkout(&mr, opts)?;
        Ok(())
    }

    fn report_checkout(&self, mr: &MergeRequest, opts: &IssueFlowOptions) -> Result<(), AppError> {
        if opts.checkout {
            self.vcs.fetch_and_checkout(&mr.source_branch)?;
            println!("Switched to branch '{}'.", mr.source_branch);
            return Ok(());
        }
        println!("Run:");
        println!("         git fetch origin");
        println!(
            "         git checkout -b '{0}' 'origin/{0}'",
            mr.source_branch
        );
        println!("to switch to new branch.");
        Ok(())
    }
}

/// Derive the branch name from issue iid and title.
///
/// Lowercased, colons and parentheses stripped (parentheses to nothing, not
/// a space), whitespace runs collapsed to single hyphens, prefixed with the
/// iid.
pub fn branch_name_for(iid: i64, title: &str) -> String {
    let cleaned: String = title
        .to_lowercase()
        .chars()
        .filter(|c| !matches!(c, ':' | '(' | ')'))
        .collect();
    let slug = cleaned.split_whitespace().collect::<Vec<_>>().join("-");
    format!("{}-{}", iid, slug)
}

/// The closing reference linking a merge request to its issue.
pub fn closing_reference(issue_iid: i64) -> String {
    format!("Closes #{}", issue_iid)
}

/// Split a total estimate evenly across fan-out targets.
///
/// Integer division; fractional minutes are truncated per target.
pub fn split_estimate(total_minutes: i64, target_count: usize) -> i64 {
    total_minutes / target_count.max(1) as i64
}

/// Issue description from the quick-action directives, when any apply.
fn build_description(iteration_id: Option<i64>, estimate_minutes: Option<i64>) -> Option<String> {
    let mut lines = Vec::new();
    if let Some(id) = iteration_id {
        lines.push(format!("/iteration *iteration:{}", id));
    }
    if let Some(minutes) = estimate_minutes {
        lines.push(format!("/estimate {}m", minutes));
    }
    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n"))
    }
}
