//! Review hand-off for the current branch's merge request.
//!
//! Runs the AI review with inline delivery, records time spent on the
//! linked issue, optionally assigns a reviewer, marks the merge request
//! ready, and can arm merge-on-pipeline-success.

use crate::error::AppError;
use crate::models::{MergeRequest, MergeRequestUpdate};
use crate::services::git::project_from_remote_url;
use crate::services::{Completion, Prompter, Tracker, Vcs};
use crate::workflows::review::{self, ReviewDelivery};
use console::style;

/// Flags for the hand-off run.
#[derive(Debug, Clone, Default)]
pub struct HandoffOptions {
    /// Pick a reviewer from the project members.
    pub pick_reviewer: bool,

    /// Merge automatically once the pipeline passes.
    pub auto_merge: bool,
}

/// Extract the issue iid from a `Closes #<iid>` reference in an MR
/// description.
pub fn closed_issue_iid(description: &str) -> Option<i64> {
    let (_, rest) = description.split_once("Closes #")?;
    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}

/// Locate the open merge request for the current branch.
pub async fn current_merge_request(
    tracker: &dyn Tracker,
    vcs: &dyn Vcs,
) -> Result<(String, MergeRequest), AppError> {
    let remote = vcs.remote_url()?;
    let project = project_from_remote_url(&remote).ok_or_else(|| {
        AppError::invalid_input(format!("cannot derive a project from remote {:?}", remote))
    })?;
    let branch = vcs.current_branch()?;
    let mr = tracker
        .find_merge_request(&project, &branch)
        .await?
        .ok_or_else(|| AppError::lookup(format!("no open merge request for branch {}", branch)))?;
    Ok((project, mr))
}

/// Run the hand-off.
pub async fn run(
    tracker: &dyn Tracker,
    vcs: &dyn Vcs,
    prompter: &dyn Prompter,
    completion: &dyn Completion,
    opts: &HandoffOptions,
) -> Result<(), AppError> {
    let (project, mr) = current_merge_request(tracker, vcs).await?;
    println!(
        "Merge request !{}: {} ({})",
        mr.iid,
        mr.title,
        style(&mr.web_url).dim()
    );

    if vcs.has_uncommitted_changes()? {
        println!(
            "{} Uncommitted changes in the working tree are not part of this review.",
            style("⚠").yellow()
        );
    }

    // AI review with inline delivery; a skipped review is not fatal here.
    println!("{} Running AI code review...", style("🤖").bold());
    match review::generate(vcs, completion).await {
        Ok(Some(report)) => {
            review::display(&report);
            ReviewDelivery::new(tracker)
                .deliver(&project, mr.iid, &report)
                .await?;
        }
        Ok(None) => {}
        Err(e) => {
            log::warn!("AI review skipped: {}", e);
            println!("{} AI review skipped: {}", style("⚠").yellow(), e);
        }
    }

    // Time tracking on the linked issue.
    if let Some(issue_iid) = mr.description.as_deref().and_then(closed_issue_iid) {
        if let Some(minutes) = prompter.input("Minutes spent (empty to skip)")? {
            let minutes: i64 = minutes.parse().map_err(|_| {
                AppError::invalid_input(format!("minutes must be a number, got {:?}", minutes))
            })?;
            tracker
                .add_spent_time(&project, issue_iid, &format!("{}m", minutes))
                .await?;
            println!(
                "{} Recorded {}m on issue #{}.",
                style("✓").green(),
                minutes,
                issue_iid
            );
        }
    } else {
        log::debug!("MR !{} has no closing issue reference", mr.iid);
    }

    let mut update = MergeRequestUpdate::default();

    // Reviewer assignment.
    if opts.pick_reviewer {
        let members = tracker.list_members(&project).await?;
        let names: Vec<String> = members.iter().map(|m| m.username.clone()).collect();
        if let Some(chosen) = prompter.select("Select reviewer", &names)? {
            if let Some(member) = members.iter().find(|m| m.username == chosen) {
                update.reviewer_ids = Some(vec![member.id]);
            }
        }
    }

    // Mark ready by stripping the Draft prefix.
    if let Some(ready_title) = mr.title.strip_prefix("Draft: ") {
        update.title = Some(ready_title.to_string());
    }

    if update.title.is_some() || update.reviewer_ids.is_some() {
        tracker.update_merge_request(&project, mr.iid, &update).await?;
        println!("{} Merge request updated.", style("✓").green());
    }

    if opts.auto_merge {
        tracker.merge_when_pipeline_succeeds(&project, mr.iid).await?;
        println!(
            "{} Will merge automatically when the pipeline succeeds.",
            style("✓").green()
        );
    }

    Ok(())
}
